mod app;
mod args;
mod scene;
mod shaders;

use anyhow::Result;
use winit::dpi::LogicalSize;

use prism_engine::logging::{LoggingConfig, init_logging};
use prism_engine::window::{Runtime, RuntimeConfig};

use app::CubeApp;
use args::{Args, Command, parse_args, print_help};

fn main() {
    let args = match parse_args(std::env::args().skip(1)) {
        Ok(Command::Run(args)) => args,
        Ok(Command::Help) => {
            print_help();
            return;
        }
        Err(err) => {
            eprintln!("{err}");
            print_help();
            std::process::exit(2);
        }
    };

    if let Err(err) = run(args) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    init_logging(LoggingConfig {
        env_filter: args.log_filter.clone(),
        ..Default::default()
    });

    log::info!(
        "starting {:?} cube at {}x{}",
        args.variant,
        args.width,
        args.height
    );

    let config = RuntimeConfig {
        title: format!("prism: {:?} cube", args.variant).to_lowercase(),
        initial_size: LogicalSize::new(f64::from(args.width), f64::from(args.height)),
        vsync: args.vsync,
        prefer_desktop_gl: !args.gles,
    };

    Runtime::run(config, CubeApp::new(args.variant, args.texture))
}
