use std::{fmt::Display, fs, io::Read, path::Path, process::ExitCode};

use backend::{compile_module, pass0_program, pass1_program, CompilerError};
use frontend::{
    input::{StrInput, TokenStream},
    lexer::Lexer,
    parser::program::parse_program,
};

use ast::token::SourcePosition;
use clap::Parser;

#[derive(Parser, Debug)]
pub struct Args {
    /// Run the optimization passes over the generated functions
    #[arg(short = 'O')]
    optimize: bool,

    /// Print the generated IR to stdout instead of writing a file
    #[arg(short = 'i')]
    emit_ir: bool,

    /// Read the source program from stdin
    #[arg(short = 'f')]
    from_stdin: bool,

    /// Output path; defaults to the source name with an .ll extension
    #[arg(short = 'o')]
    out_file: Option<String>,

    #[arg(required_unless_present = "from_stdin")]
    src_file: Option<String>,
}

fn report(file: &str, pos: Option<SourcePosition>, error: &dyn Display) {
    match pos {
        Some(pos) => eprintln!("{file}:{pos}: {error}"),
        None => eprintln!("{file}: {error}"),
    }
}

fn run(args: &Args) -> u8 {
    let (name, text) = if args.from_stdin {
        let mut text = String::new();
        if let Err(e) = std::io::stdin().read_to_string(&mut text) {
            eprintln!("<stdin>: {e}");
            return 3;
        }
        ("<stdin>".to_owned(), text)
    } else {
        let path = args.src_file.clone().unwrap_or_default();
        match fs::read_to_string(&path) {
            Ok(text) => (path, text),
            Err(e) => {
                eprintln!("{path}: {e}");
                return 3;
            }
        }
    };

    let tokens = match Lexer::new(StrInput::new(&text)).lex_all() {
        Ok(tokens) => tokens,
        Err(e) => {
            report(&name, e.position(), &format!("syntax error: {e}"));
            return 1;
        }
    };

    let ast = match parse_program(&mut TokenStream::new(tokens)) {
        Ok(ast) => ast,
        Err(e) => {
            report(&name, e.position(), &format!("syntax error: {e}"));
            return 1;
        }
    };

    let pass1 = match pass1_program(pass0_program(), &ast) {
        Ok(pass1) => pass1,
        Err(e) => {
            report(&name, e.position(), &e);
            return 2;
        }
    };

    let ir = match compile_module(&pass1, &name, args.optimize) {
        Ok(ir) => ir,
        Err(e @ CompilerError::Internal(_)) => {
            report(&name, None, &e);
            return 10;
        }
        Err(e) => {
            report(&name, e.position(), &e);
            return 2;
        }
    };

    if args.emit_ir {
        print!("{ir}");
        return 0;
    }

    let out_file = args.out_file.clone().unwrap_or_else(|| {
        if args.from_stdin {
            "out.ll".to_owned()
        } else {
            Path::new(&name).with_extension("ll").display().to_string()
        }
    });

    if let Err(e) = fs::write(&out_file, ir) {
        eprintln!("{out_file}: {e}");
        return 3;
    }

    0
}

fn main() -> ExitCode {
    let args = Args::parse();

    ExitCode::from(run(&args))
}
