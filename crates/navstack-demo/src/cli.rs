#![forbid(unsafe_code)]

//! Command-line argument parsing for the demo.
//!
//! Parses args manually. Environment variables with the `NAVSTACK_DEMO_`
//! prefix provide defaults; explicit flags win.

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const HELP_TEXT: &str = "\
navstack demo: scripted panel navigation

USAGE:
    navstack-demo [OPTIONS]

OPTIONS:
    --frame-ms=N         Simulated frame length in milliseconds (default: 16)
    --max-frames=N       Frame cap per scripted step (default: 240)
    --instant            Skip fade transitions
    --quiet              Do not print tree snapshots
    --help, -h           Show this help message
    --version, -V        Show version

ENVIRONMENT VARIABLES:
    NAVSTACK_DEMO_FRAME_MS    Override --frame-ms
    NAVSTACK_DEMO_MAX_FRAMES  Override --max-frames
    RUST_LOG                  Log filter (default: navstack=debug)

Navigator settings come from NAVSTACK_* variables, e.g.
NAVSTACK_TRANSITION_MS, NAVSTACK_DESTROY_GRACE_MS, NAVSTACK_REDUCED_MOTION.";

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opts {
    pub frame_ms: u64,
    /// Frames to run before giving up on a step settling.
    pub max_frames: u32,
    pub instant: bool,
    pub quiet: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            frame_ms: 16,
            max_frames: 240,
            instant: false,
            quiet: false,
        }
    }
}

/// What the process should do after parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
    Run(Opts),
    Help,
    Version,
}

impl Opts {
    /// Parse `args` (without the program name) on top of environment
    /// defaults read through `get_env`.
    pub fn parse_from<I, F>(args: I, get_env: F) -> Result<Parsed, String>
    where
        I: IntoIterator<Item = String>,
        F: Fn(&str) -> Option<String>,
    {
        let mut opts = Self::default();

        if let Some(val) = get_env("NAVSTACK_DEMO_FRAME_MS")
            && let Ok(n) = val.parse()
        {
            opts.frame_ms = n;
        }
        if let Some(val) = get_env("NAVSTACK_DEMO_MAX_FRAMES")
            && let Ok(n) = val.parse()
        {
            opts.max_frames = n;
        }

        for arg in args {
            match arg.as_str() {
                "--help" | "-h" => return Ok(Parsed::Help),
                "--version" | "-V" => return Ok(Parsed::Version),
                "--instant" => opts.instant = true,
                "--quiet" => opts.quiet = true,
                other => {
                    if let Some(val) = other.strip_prefix("--frame-ms=") {
                        opts.frame_ms = val
                            .parse()
                            .map_err(|_| format!("Invalid --frame-ms value: {val}"))?;
                    } else if let Some(val) = other.strip_prefix("--max-frames=") {
                        opts.max_frames = val
                            .parse()
                            .map_err(|_| format!("Invalid --max-frames value: {val}"))?;
                    } else {
                        return Err(format!("Unknown argument: {other}"));
                    }
                }
            }
        }

        if opts.frame_ms == 0 {
            return Err("--frame-ms must be positive".to_string());
        }
        Ok(Parsed::Run(opts))
    }
}

pub fn version() -> String {
    format!("navstack-demo {VERSION}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Parsed, String> {
        Opts::parse_from(args.iter().map(|s| s.to_string()), |_| None)
    }

    #[test]
    fn default_opts() {
        assert_eq!(parse(&[]), Ok(Parsed::Run(Opts::default())));
    }

    #[test]
    fn flags_override_env() {
        let parsed = Opts::parse_from(
            ["--frame-ms=8".to_string(), "--instant".to_string()],
            |key| (key == "NAVSTACK_DEMO_FRAME_MS").then(|| "33".to_string()),
        );
        assert_eq!(
            parsed,
            Ok(Parsed::Run(Opts {
                frame_ms: 8,
                instant: true,
                ..Opts::default()
            }))
        );
    }

    #[test]
    fn env_applies_without_flag() {
        let parsed = Opts::parse_from(Vec::new(), |key| {
            (key == "NAVSTACK_DEMO_MAX_FRAMES").then(|| "10".to_string())
        });
        let Ok(Parsed::Run(opts)) = parsed else {
            panic!("expected run, got {parsed:?}");
        };
        assert_eq!(opts.max_frames, 10);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse(&["--frame-ms=abc"]).is_err());
        assert!(parse(&["--frame-ms=0"]).is_err());
        assert!(parse(&["--bogus"]).is_err());
        assert_eq!(parse(&["-h"]), Ok(Parsed::Help));
        assert_eq!(parse(&["--version"]), Ok(Parsed::Version));
    }

    #[test]
    fn help_mentions_env() {
        assert!(HELP_TEXT.contains("NAVSTACK_DEMO_FRAME_MS"));
        assert!(version().starts_with("navstack-demo "));
    }
}
