use clap::Parser;
use lc3::{Config, Error, Terminal};
use std::io;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(
    name = "lc3",
    about = "A faithful instruction-set simulator for the LC-3 architecture"
)]
struct Cli {
    /// Object image(s) to load and run, in order.
    #[arg(value_name = "IMAGE")]
    images: Vec<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let config = match Config::with(cli.images) {
        Ok(config) => config,
        Err(Error::Usage) => {
            println!("lc3 [image-file1] ...");
            process::exit(2);
        }
        Err(e) => {
            println!("{}", e);
            process::exit(1);
        }
    };

    let terminal = Terminal::acquire().unwrap_or_else(|e| {
        println!("failed to acquire terminal: {}", e);
        process::exit(1);
    });

    install_interrupt_handler(terminal.restore_handle());

    let mut io_adapter = terminal;
    let mut stdout = io::stdout();

    match lc3::run(config, &mut io_adapter, &mut stdout) {
        Ok(()) => {}
        Err(e @ (Error::ImageOpen { .. } | Error::ImageFormat { .. })) => {
            println!("{}", e);
            process::exit(1);
        }
        Err(Error::IllegalInstruction { .. }) => {
            io_adapter.restore();
            process::abort();
        }
        Err(Error::Usage) => unreachable!("already validated above"),
    }
}

fn install_interrupt_handler(restore: lc3::RestoreHandle) {
    ctrlc::set_handler(move || {
        restore.restore();
        println!();
        process::exit(-2);
    })
    .expect("failed to install interrupt handler");
}
