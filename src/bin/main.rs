use std::{
    error::Error,
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::Parser;
use titan::{
    codegen::RUNTIME_MODULE,
    lexer::Lexer,
    token::Token,
    util::{
        fmt::{tree, Context, Show},
        intern::Interner,
        BreakableIteratorExt,
    },
};

/// Translates Titan scripts into Rust programs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The Titan source file.
    input: PathBuf,

    /// Where to write the generated program and its runtime module. Defaults
    /// to the directory of the input file.
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// What to produce.
    #[arg(long, value_enum, default_value_t = Emit::Rust)]
    emit: Emit,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
enum Emit {
    /// The generated Rust program, along with the runtime module.
    Rust,
    /// The token stream, printed to stdout.
    Tokens,
    /// The syntax tree, printed to stdout.
    Tree,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let src = fs::read_to_string(&args.input)
        .map_err(|e| format!("failed to read `{}`: {e}", args.input.display()))?;

    match args.emit {
        Emit::Tokens => {
            for token in Lexer::new(&src).up_to(Token::is_eof) {
                println!(
                    "{:>4} {:<16} {:?}",
                    token.span().line,
                    token.kind.to_string(),
                    token.text(&src)
                );
            }
            Ok(())
        }
        Emit::Tree => {
            let mut idents = Interner::with_capacity(128);
            let program = titan::parse(&src, &mut idents).map_err(|e| format!("{e:#}"))?;
            print!("{}", tree::print_program_string(&idents, &program));
            Ok(())
        }
        Emit::Rust => {
            let program_name = program_file_name(&args.input)?;
            let compilation = titan::compile(&src).map_err(|e| format!("{e:#}"))?;
            let ctx = Context {
                ident_interner: &compilation.idents,
            };
            for warning in &compilation.output.warnings {
                eprintln!("warning: {:#}", warning.display(&ctx));
            }

            let out_dir = match &args.out_dir {
                Some(dir) => dir.clone(),
                None => input_dir(&args.input),
            };
            fs::create_dir_all(&out_dir)?;

            let program_path = out_dir.join(program_name);
            let runtime_path = out_dir.join(format!("{RUNTIME_MODULE}.rs"));
            fs::write(&program_path, &compilation.output.program)?;
            fs::write(&runtime_path, compilation.output.runtime)?;
            println!("wrote {}", program_path.display());
            Ok(())
        }
    }
}

/// The generated program is named after the input, keeping every dot of its
/// stem. It can't take the runtime module's name.
fn program_file_name(input: &Path) -> Result<String, String> {
    let stem = input
        .file_stem()
        .ok_or_else(|| format!("`{}` is not a file", input.display()))?
        .to_string_lossy();
    if stem == RUNTIME_MODULE {
        return Err(format!(
            "`{}` would be overwritten by the runtime module, rename it",
            input.display()
        ));
    }
    Ok(format!("{stem}.rs"))
}

fn input_dir(input: &Path) -> PathBuf {
    match input.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_program_file_name() {
        let name = |path: &str| program_file_name(Path::new(path));
        assert_eq!(name("demos/guess.tn"), Ok("guess.rs".to_owned()));
        assert_eq!(name("my.prog.tn"), Ok("my.prog.rs".to_owned()));
        assert_eq!(name("noext"), Ok("noext.rs".to_owned()));
        assert_eq!(
            name("scripts/titan_runtime.tn"),
            Err("`scripts/titan_runtime.tn` would be overwritten by the runtime module, rename it"
                .to_owned())
        );
        assert!(name("..").is_err());
    }

    #[test]
    fn test_input_dir() {
        assert_eq!(input_dir(Path::new("guess.tn")), PathBuf::from("."));
        assert_eq!(input_dir(Path::new("demos/guess.tn")), PathBuf::from("demos"));
    }
}
