use std::io;
use std::process::ExitCode;

use geospread::runner::{run_with_args, write_output};

fn main() -> ExitCode {
    let result = run_with_args(|_, _| Ok(())).and_then(|(context, args)| {
        write_output(&context, args.output, &mut io::stdout().lock())?;
        Ok(())
    });
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
