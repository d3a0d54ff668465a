use jiff::SpanRelativeTo;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Threads {
    Single,
    Auto,
    Multi(usize),
}

impl Threads {
    pub fn number_of_threads(&self) -> usize {
        match self {
            Threads::Single => 1,
            Threads::Multi(num) => *num,
            Threads::Auto => std::thread::available_parallelism().map_or(1, |n| n.get()),
        }
    }
}

pub fn parse_threads(input: &str) -> Result<Threads, String> {
    match input.trim().to_ascii_lowercase().as_str() {
        "auto" => Ok(Threads::Auto),
        "1" | "single" => Ok(Threads::Single),
        other => match other.parse::<usize>() {
            Ok(0) => Err(String::from("Thread count must be at least 1")),
            Ok(num) => Ok(Threads::Multi(num)),
            Err(_) => Err(format!("Invalid thread count '{other}'")),
        },
    }
}

pub fn parse_duration(input: &str) -> Result<jiff::SignedDuration, String> {
    if let Ok(duration) = input.parse::<jiff::SignedDuration>() {
        return Ok(duration);
    }

    if let Ok(duration) = input
        .parse::<jiff::Span>()
        .and_then(|span| span.to_duration(SpanRelativeTo::days_are_24_hours()))
    {
        return Ok(duration);
    }

    // Bare numbers are minutes, the unit of edge durations
    if let Ok(minutes) = input.parse::<i64>() {
        return Ok(jiff::SignedDuration::from_mins(minutes.abs()));
    }

    Err(String::from("Invalid duration"))
}
