use std::io::Write;

use super::command::Command;
use crate::errors::DbError;
use crate::students::{Mark, NameAvgScore, Student, StudentRecord, StudentsService};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OutputMode {
    Human,
    Plain,
    Json,
}

/// What a command produced, before rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Student(Student),
    MaybeStudent(Option<Student>),
    Students(Vec<Student>),
    Marks(Vec<Mark>),
    Names(Vec<String>),
    Averages(Vec<NameAvgScore>),
    Removed(StudentRecord),
}

/// Runs one command against the service.
///
/// # Errors
/// Whatever the service operation returns.
pub fn execute(service: &StudentsService, cmd: Command) -> Result<Output, DbError> {
    log::debug!("cli: {cmd:?}");
    let out = match cmd {
        Command::AddStudent { id, name, phone } => Output::Student(service.add_student(&Student::new(id, name, phone))?),
        Command::UpdatePhone { id, phone } => Output::Student(service.update_phone(id, &phone)?),
        Command::AddMark { id, subject, date, score } => Output::Marks(service.add_mark(id, Mark::new(subject, date, score))?),
        Command::RemoveStudent { id } => Output::Removed(service.remove_student(id)?),
        Command::Marks { id } => Output::Marks(service.get_marks(id)?),
        Command::ByPhone { phone } => Output::MaybeStudent(service.get_student_by_phone(&phone)?),
        Command::ByPhonePrefix { prefix } => Output::Students(service.get_student_by_phone_prefix(&prefix)?),
        Command::GoodMarks { threshold } => Output::Students(service.get_students_all_good_marks(threshold)?),
        Command::FewMarks { threshold } => Output::Students(service.get_students_few_marks(threshold)?),
        Command::PurgeFewMarks { threshold } => Output::Students(service.purge_students_few_marks(threshold)?),
        Command::GoodMarksSubject { subject, threshold } => {
            Output::Students(service.get_students_all_good_marks_subject(&subject, threshold)?)
        }
        Command::MarksBetween { min, max } => Output::Students(service.get_students_marks_amount_between(min, max)?),
        Command::SubjectMarks { id, subject } => Output::Marks(service.get_student_subject_marks(id, &subject)?),
        Command::AvgScore { threshold } => Output::Averages(service.get_student_avg_score(threshold)?),
        Command::MarksAtDates { id, from, to } => Output::Marks(service.get_student_marks_at_dates(id, from, to)?),
        Command::Best { n } => Output::Names(service.get_best_students(n)?),
        Command::Worst { n } => Output::Names(service.get_worst_students(n)?),
    };
    Ok(out)
}

fn write_student(out: &mut impl Write, mode: OutputMode, s: &Student) -> std::io::Result<()> {
    match mode {
        OutputMode::Plain => writeln!(out, "{}\t{}\t{}", s.id, s.name, s.phone),
        _ => writeln!(out, "id={} name={} phone={}", s.id, s.name, s.phone),
    }
}

fn write_mark(out: &mut impl Write, mode: OutputMode, m: &Mark) -> std::io::Result<()> {
    match mode {
        OutputMode::Plain => writeln!(out, "{}\t{}\t{}", m.subject, m.date, m.score),
        _ => writeln!(out, "subject={} date={} score={}", m.subject, m.date, m.score),
    }
}

fn write_json<T: serde::Serialize + ?Sized>(out: &mut impl Write, value: &T) -> Result<(), DbError> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Renders an output; JSON mode writes exactly one JSON value per call.
///
/// # Errors
/// I/O or serialization failures on `out`.
pub fn render(out: &mut impl Write, mode: OutputMode, output: &Output) -> Result<(), DbError> {
    if mode == OutputMode::Json {
        return match output {
            Output::Student(s) => write_json(out, s),
            Output::MaybeStudent(s) => write_json(out, s),
            Output::Students(v) => write_json(out, v),
            Output::Marks(v) => write_json(out, v),
            Output::Names(v) => write_json(out, v),
            Output::Averages(v) => write_json(out, v),
            Output::Removed(r) => write_json(out, r),
        };
    }
    match output {
        Output::Student(s) => write_student(out, mode, s)?,
        Output::MaybeStudent(Some(s)) => write_student(out, mode, s)?,
        Output::MaybeStudent(None) => {
            if mode == OutputMode::Human {
                writeln!(out, "no student found")?;
            }
        }
        Output::Students(v) => {
            for s in v {
                write_student(out, mode, s)?;
            }
            if mode == OutputMode::Human {
                writeln!(out, "students: {}", v.len())?;
            }
        }
        Output::Marks(v) => {
            for m in v {
                write_mark(out, mode, m)?;
            }
            if mode == OutputMode::Human {
                writeln!(out, "marks: {}", v.len())?;
            }
        }
        Output::Names(v) => {
            for n in v {
                writeln!(out, "{n}")?;
            }
        }
        Output::Averages(v) => {
            for a in v {
                match mode {
                    OutputMode::Plain => writeln!(out, "{}\t{}", a.name, a.avg_score)?,
                    _ => writeln!(out, "name={} avg_score={}", a.name, a.avg_score)?,
                }
            }
        }
        Output::Removed(r) => match mode {
            OutputMode::Plain => writeln!(out, "{}\t{}\t{}\t{}", r.id, r.name, r.phone, r.marks.len())?,
            _ => writeln!(out, "removed id={} name={} phone={} marks={}", r.id, r.name, r.phone, r.marks.len())?,
        },
    }
    Ok(())
}

/// Executes `cmd` and renders its result to `out`.
///
/// # Errors
/// See [`execute`] and [`render`].
pub fn run_with_format(
    service: &StudentsService,
    cmd: Command,
    mode: OutputMode,
    out: &mut impl Write,
) -> Result<(), DbError> {
    let output = execute(service, cmd)?;
    render(out, mode, &output)
}

/// [`run_with_format`] in human mode to stdout.
///
/// # Errors
/// See [`run_with_format`].
pub fn run(service: &StudentsService, cmd: Command) -> Result<(), DbError> {
    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    run_with_format(service, cmd, OutputMode::Human, &mut lock)
}
