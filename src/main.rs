mod args;
mod compile_error;
mod reporting;

use crate::args::*;
use crate::compile_error::*;
use crate::reporting::report_err;
use codespan_reporting::diagnostic::Severity;
use jv_common::{read_source_file, DiagnosticOutput};
use jv_syn::{parse_unit, Flags, Unit};
use jv_typecheck::{BuiltinClasspath, CheckedProgram, Type, Typed};
use std::{
    fs::{self, File},
    io,
    path::PathBuf,
    process,
};
use structopt::StructOpt;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

enum CompileOutput {
    Parse(Vec<Unit<Typed>>),
    Typecheck(CheckedProgram),
}

fn init_logging(args: &Args) {
    let default_level = if args.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .compact()
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("warning: a logger was already installed");
    }
}

fn parse_file(path: &PathBuf) -> Result<Unit<Typed>, CompileError> {
    let src = read_source_file(path).map_err(|err| CompileError::ReadSourceFileFailed {
        path: path.clone(),
        msg: err.to_string(),
    })?;

    debug!("parsing unit @ `{}`", path.display());
    let unit = parse_unit(path.clone(), &src)?;
    Ok(unit)
}

fn compile(args: &Args) -> Result<CompileOutput, CompileError> {
    if args.max_passes == 0 {
        let msg = "at least one pass is required".to_string();
        return Err(CompileError::InvalidArguments(msg));
    }

    let opts = args.build_options();

    let units = args.files.iter().map(parse_file).collect::<Result<Vec<_>, _>>()?;

    if let Some(CompileStage::Parse) = args.print_stage {
        return Ok(CompileOutput::Parse(units));
    }

    info!("checking {} unit(s)", units.len());
    let program = jv_typecheck::compile(units, BuiltinClasspath::new(), opts)?;

    Ok(CompileOutput::Typecheck(program))
}

fn print_output<F>(out_path: Option<&PathBuf>, f: F) -> Result<(), CompileError>
where
    F: FnOnce(&mut dyn io::Write) -> io::Result<()>,
{
    let out_name;

    let io_result = match out_path {
        Some(out_path) => {
            let create_dirs = match out_path.parent() {
                Some(parent) => fs::create_dir_all(parent),
                None => Ok(()),
            };

            out_name = out_path.display().to_string();

            create_dirs
                .and_then(|_| File::create(out_path))
                .and_then(|mut file| f(&mut file))
        },

        None => {
            let stdout = io::stdout();
            let mut stdout_lock = stdout.lock();

            out_name = "stdout".to_string();

            f(&mut stdout_lock)
        },
    };

    io_result.map_err(|io_err| CompileError::OutputFailed(out_name, io_err))
}

fn flags_prefix(flags: Flags) -> String {
    if flags.is_empty() {
        String::new()
    } else {
        format!("{} ", flags)
    }
}

/// Lists each source class with the facts the checker settled on for it.
fn write_class_summary(dst: &mut dyn io::Write, program: &CheckedProgram) -> io::Result<()> {
    let defs = &program.defs;

    for class in defs.classes().filter(|class| !class.is_binary()) {
        let keyword = if class.is_interface() { "interface" } else { "class" };
        write!(dst, "{}{} {}", flags_prefix(class.flags), keyword, class.full_name)?;

        if let Some(Some(superclass)) = class.superclass.latest() {
            write!(dst, " extends {}", superclass)?;
        }

        if let Some(interfaces) = class.interfaces.latest().filter(|list| !list.is_empty()) {
            let names: Vec<_> = interfaces.iter().map(Type::to_string).collect();
            write!(dst, " implements {}", names.join(", "))?;
        }
        writeln!(dst)?;

        for field_id in &class.fields {
            let field = defs.field(*field_id);
            let ty = field.ty.latest().cloned().unwrap_or(Type::Unknown);
            write!(dst, "    {}{} {}", flags_prefix(field.flags), ty, field.name)?;

            if let Some(Some(constant)) = field.constant.latest() {
                write!(dst, " = {}", constant)?;
            }
            writeln!(dst)?;
        }

        for proc_id in class.ctors.iter().chain(class.methods.iter()) {
            let proc = defs.proc(*proc_id);
            match proc.sig.latest() {
                Some(sig) => writeln!(dst, "    {}{}: {}", flags_prefix(proc.flags), proc.name, sig)?,
                None => writeln!(dst, "    {}{}: ?", flags_prefix(proc.flags), proc.name)?,
            }
        }
    }

    Ok(())
}

fn handle_output(output: CompileOutput, args: &Args) -> Result<(), CompileError> {
    match output {
        CompileOutput::Parse(units) => print_output(args.output.as_ref(), |dst| {
            for unit in units {
                writeln!(dst, "{:#?}", unit)?;
            }
            Ok(())
        }),

        CompileOutput::Typecheck(program) => {
            if args.print_stage.is_some() || args.output.is_some() {
                print_output(args.output.as_ref(), |dst| write_class_summary(dst, &program))
            } else {
                info!("{} unit(s) checked", program.units.len());
                Ok(())
            }
        },
    }
}

fn report(err: &CompileError) {
    let result = match err {
        CompileError::TypecheckErrors(errors) => errors
            .iter()
            .try_for_each(|err| report_err(err, Severity::Error)),

        _ => report_err(err, Severity::Error),
    };

    if let Err(output_err) = result {
        eprintln!("error: {}", err);
        eprintln!("error reporting output: {}", output_err);
    }
}

fn main() {
    let args: Args = Args::from_args();
    init_logging(&args);

    if let Err(err) = compile(&args).and_then(|output| handle_output(output, &args)) {
        report(&err);

        if args.backtrace {
            if let Some(bt) = err.backtrace() {
                eprintln!("{:?}", bt);
            }
        }

        process::exit(1)
    }
}
