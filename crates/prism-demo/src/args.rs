use std::path::PathBuf;

use crate::scene::Variant;

/// Parsed command line.
#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    pub variant: Variant,
    pub texture: Option<PathBuf>,
    pub width: u32,
    pub height: u32,
    pub log_filter: Option<String>,
    pub vsync: bool,
    /// Skip desktop GL and ask for GLES 3.0 directly.
    pub gles: bool,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            variant: Variant::Lit,
            texture: None,
            width: 640,
            height: 480,
            log_filter: None,
            vsync: true,
            gles: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Run(Args),
    Help,
}

pub fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Command, String> {
    let mut out = Args::default();

    let mut it = args.into_iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--variant" => {
                let value = value_for(&mut it, "--variant")?;
                out.variant = value.parse()?;
            }
            "--texture" => {
                out.texture = Some(PathBuf::from(value_for(&mut it, "--texture")?));
            }
            "--width" => {
                out.width = dimension(&value_for(&mut it, "--width")?, "--width")?;
            }
            "--height" => {
                out.height = dimension(&value_for(&mut it, "--height")?, "--height")?;
            }
            "--log" => {
                out.log_filter = Some(value_for(&mut it, "--log")?);
            }
            "--no-vsync" => out.vsync = false,
            "--gles" => out.gles = true,
            "--help" | "-h" => return Ok(Command::Help),
            other => return Err(format!("unknown argument: {other}")),
        }
    }

    Ok(Command::Run(out))
}

fn value_for(it: &mut impl Iterator<Item = String>, flag: &str) -> Result<String, String> {
    it.next().ok_or_else(|| format!("missing value for {flag}"))
}

fn dimension(value: &str, flag: &str) -> Result<u32, String> {
    let v = value
        .parse::<u32>()
        .map_err(|_| format!("invalid {flag} value: {value}"))?;
    if v == 0 {
        return Err(format!("{flag} must be > 0"));
    }
    Ok(v)
}

pub fn print_help() {
    eprintln!("prism-demo [--variant flat|lit] [--texture PATH] [--width W] [--height H]");
    eprintln!("           [--log FILTER] [--no-vsync] [--gles] [--help]");
    eprintln!("controls: Esc exit");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Command, String> {
        parse_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn defaults_without_arguments() {
        assert_eq!(parse(&[]), Ok(Command::Run(Args::default())));
    }

    #[test]
    fn all_flags() {
        let cmd = parse(&[
            "--variant", "flat", "--texture", "cubetexture.png", "--width", "800", "--height",
            "600", "--log", "debug", "--no-vsync", "--gles",
        ])
        .unwrap();
        assert_eq!(
            cmd,
            Command::Run(Args {
                variant: Variant::Flat,
                texture: Some(PathBuf::from("cubetexture.png")),
                width: 800,
                height: 600,
                log_filter: Some("debug".into()),
                vsync: false,
                gles: true,
            })
        );
    }

    #[test]
    fn help_wins() {
        assert_eq!(parse(&["--width", "10", "--help"]), Ok(Command::Help));
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(parse(&["--width", "0"]).unwrap_err().contains("> 0"));
        assert!(parse(&["--height", "tall"]).is_err());
        assert!(parse(&["--variant", "shiny"]).unwrap_err().contains("shiny"));
        assert!(parse(&["--texture"]).unwrap_err().contains("missing value"));
        assert!(parse(&["--fullscreen"]).is_err());
    }
}
