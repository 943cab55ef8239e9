use std::process::ExitCode;

use calspan::{
    AllocationPolicy, ArithmeticMode, Basis, BigDuration, CalendarSpan, DurationBreakdown,
    DurationSpan, Error, TimestampWithZone, Zone,
};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, warn};

#[derive(Parser)]
#[command(name = "calspan", version, about = "Calendar-aware elapsed time")]
struct Cli {
    /// Zone timestamps are read and shown in
    #[arg(long, global = true, env = "CALSPAN_TZ", default_value = "Local")]
    zone: String,

    /// Timestamp pattern; empty means the default pattern
    #[arg(long, global = true, env = "CALSPAN_PATTERN", default_value = "")]
    pattern: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Break down the span between two timestamps
    Between {
        start: String,
        end: String,
        #[arg(short, long, default_value = "standard")]
        policy: String,
    },
    /// Break down a span given as a start and signed nanoseconds
    Elapsed {
        start: String,
        #[arg(allow_hyphen_values = true)]
        nanoseconds: String,
        #[arg(short, long, default_value = "standard")]
        policy: String,
    },
    /// Add calendar and clock units to a timestamp
    Add {
        start: String,
        #[command(flatten)]
        span: SpanArgs,
        #[arg(short, long, default_value = "local")]
        mode: String,
    },
    /// Place a signed nanosecond count of any size on the calendar
    Materialize {
        base: String,
        #[arg(allow_hyphen_values = true)]
        nanoseconds: String,
        #[arg(short, long, default_value = "local")]
        mode: String,
    },
    /// Show a timestamp in another zone
    Convert {
        timestamp: String,
        #[arg(long)]
        to: String,
    },
}

#[derive(Args)]
struct SpanArgs {
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    years: i64,
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    months: i64,
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    days: i64,
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    hours: i64,
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    minutes: i64,
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    seconds: i64,
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    milliseconds: i64,
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    microseconds: i64,
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    nanoseconds: i64,
}

impl SpanArgs {
    fn to_span(&self) -> CalendarSpan {
        CalendarSpan::new()
            .years(self.years)
            .months(self.months)
            .days(self.days)
            .hours(self.hours)
            .minutes(self.minutes)
            .seconds(self.seconds)
            .milliseconds(self.milliseconds)
            .microseconds(self.microseconds)
            .nanoseconds(self.nanoseconds)
    }
}

struct Context {
    zone: Zone,
    pattern: String,
}

impl Context {
    /// Read a timestamp in the active zone. `now` is the current instant;
    /// text naming another zone is read in that zone.
    fn timestamp(&self, text: &str) -> calspan::Result<TimestampWithZone> {
        if text.eq_ignore_ascii_case("now") {
            return Ok(TimestampWithZone::now(&self.zone));
        }
        match TimestampWithZone::parse_in(text, &self.pattern, &self.zone) {
            Err(Error::OffsetMismatch { .. }) => {
                debug!(text, "zone in text differs from the active zone");
                TimestampWithZone::parse(text, &self.pattern)
            }
            other => other,
        }
    }

    fn show(&self, ts: &TimestampWithZone) -> String {
        ts.format(&self.pattern)
    }
}

fn print_breakdown(ctx: &Context, breakdown: &DurationBreakdown) {
    println!("start:       {}", breakdown.format_start(&ctx.pattern));
    println!("end:         {}", breakdown.format_end(&ctx.pattern));
    println!("policy:      {}", breakdown.policy());
    println!("breakdown:   {breakdown}");
    println!("nanoseconds: {}", breakdown.span().to_big());
}

fn run(cli: Cli) -> calspan::Result<()> {
    let ctx = Context {
        zone: calspan::resolve(&cli.zone)?,
        pattern: cli.pattern,
    };
    debug!(zone = %ctx.zone, "active zone");

    match cli.command {
        Command::Between { start, end, policy } => {
            let policy: AllocationPolicy = policy.parse()?;
            let basis = Basis::Between {
                start: ctx.timestamp(&start)?,
                end: ctx.timestamp(&end)?,
            };
            let breakdown = calspan::decompose(&basis, ctx.zone.name(), policy)?;
            print_breakdown(&ctx, &breakdown);
        }
        Command::Elapsed {
            start,
            nanoseconds,
            policy,
        } => {
            let policy: AllocationPolicy = policy.parse()?;
            let start = ctx.timestamp(&start)?.in_zone(&ctx.zone);
            let duration: BigDuration = nanoseconds.parse()?;
            let breakdown = match duration.nanoseconds() {
                Some(nanoseconds) => {
                    calspan::decompose(&Basis::Elapsed { start, nanoseconds }, "", policy)?
                }
                None => {
                    let span = DurationSpan::from_big(&start, &duration, ArithmeticMode::LocalZone)?;
                    calspan::decompose_span(&span, policy)?
                }
            };
            print_breakdown(&ctx, &breakdown);
        }
        Command::Add { start, span, mode } => {
            let mode: ArithmeticMode = mode.parse()?;
            let start = ctx.timestamp(&start)?.in_zone(&ctx.zone);
            let span = span.to_span();
            let end = calspan::add_calendar_span(&start, &span, mode)?;
            if start.zone().has_transition_between(&start.utc(), &end.utc()) {
                let other = match mode {
                    ArithmeticMode::LocalZone => ArithmeticMode::UtcNormalized,
                    ArithmeticMode::UtcNormalized => ArithmeticMode::LocalZone,
                };
                let alternative = calspan::add_calendar_span(&start, &span, other)?;
                if !alternative.same_rendering(&end) {
                    warn!(
                        "a DST transition falls inside the span: {other} arithmetic gives {}",
                        ctx.show(&alternative)
                    );
                }
            }
            println!("{}", ctx.show(&end));
        }
        Command::Materialize {
            base,
            nanoseconds,
            mode,
        } => {
            let mode: ArithmeticMode = mode.parse()?;
            let base = ctx.timestamp(&base)?.in_zone(&ctx.zone);
            let mut duration: BigDuration = nanoseconds.parse()?;
            let (start, end) = duration.materialize(&base, mode)?;
            println!("start: {}", ctx.show(&start));
            println!("end:   {}", ctx.show(&end));
        }
        Command::Convert { timestamp, to } => {
            let ts = ctx.timestamp(&timestamp)?;
            let target = calspan::resolve(&to)?;
            let converted = ts.in_zone(&target);
            println!("{}", ctx.show(&converted));
            let (convertible, canonical) = calspan::is_convertible(&converted);
            if convertible {
                println!("{} is {}", converted.abbreviation(), canonical.zone());
            } else {
                println!("{} does not name a single zone", converted.abbreviation());
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("calspan: {err}");
            if err.kind().is_validation() {
                ExitCode::from(2)
            } else {
                ExitCode::from(1)
            }
        }
    }
}
