use codespan_reporting::{
    diagnostic::{Diagnostic, Label, LabelStyle, Severity},
    files::{Error as FileError, Files, SimpleFiles},
    term::termcolor,
};
use jv_common::{path_relative_to_cwd, read_source_file, DiagnosticMessage, DiagnosticOutput};
use std::{collections::HashMap, path::PathBuf};

type CodeMap = SimpleFiles<String, String>;

struct Reporter {
    code_map: CodeMap,
    file_ids: HashMap<PathBuf, usize>,
}

impl Reporter {
    fn new() -> Self {
        Self {
            code_map: CodeMap::new(),
            file_ids: HashMap::new(),
        }
    }

    fn file_id(&mut self, path: &PathBuf) -> Result<usize, FileError> {
        let nice_filename = path_relative_to_cwd(path).to_path_buf();
        if let Some(file_id) = self.file_ids.get(&nice_filename) {
            return Ok(*file_id);
        }

        let src = read_source_file(path)?;
        let file_id = self.code_map.add(nice_filename.display().to_string(), src);
        self.file_ids.insert(nice_filename, file_id);
        Ok(file_id)
    }

    fn to_report_diag(
        &mut self,
        diag: DiagnosticMessage,
        style: LabelStyle,
        severity: Severity,
    ) -> Result<Diagnostic<usize>, FileError> {
        let mut labels = Vec::new();
        let mut notes = diag.notes;

        match diag.label {
            // builtin classes have no source to point at
            Some(label) if label.span.is_builtin() => notes.extend(label.text),

            Some(label) => {
                let file_id = self.file_id(&label.span.file)?;

                let start_loc = &label.span.start;
                let end_loc = &label.span.end;

                let err_start = self.code_map.line_range(file_id, start_loc.line)?.start + start_loc.col;
                let err_end = self.code_map.line_range(file_id, end_loc.line)?.start + end_loc.col + 1;
                let err_end = err_end.min(self.code_map.source(file_id)?.len()).max(err_start);

                let report_label = Label::new(style, file_id, err_start..err_end);
                labels.push(match label.text {
                    Some(text) => report_label.with_message(text),
                    None => report_label,
                });
            },

            None => {},
        }

        Ok(Diagnostic::new(severity)
            .with_labels(labels)
            .with_notes(notes)
            .with_message(diag.title))
    }
}

pub fn report_err(err: &impl DiagnosticOutput, severity: Severity) -> Result<(), FileError> {
    let out = termcolor::StandardStream::stderr(termcolor::ColorChoice::Auto);
    let config = codespan_reporting::term::Config::default();

    let mut reporter = Reporter::new();
    let main_diag = reporter.to_report_diag(err.main(), LabelStyle::Primary, severity)?;

    codespan_reporting::term::emit(&mut out.lock(), &config, &reporter.code_map, &main_diag)?;

    let see_also_diags: Vec<_> = err
        .see_also()
        .into_iter()
        .map(|diag| reporter.to_report_diag(diag, LabelStyle::Secondary, Severity::Note))
        .collect::<Result<_, _>>()?;

    for diag in see_also_diags {
        codespan_reporting::term::emit(&mut out.lock(), &config, &reporter.code_map, &diag)?;
    }

    Ok(())
}
