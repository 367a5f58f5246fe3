use anyhow::{Context, Result};
use log::LevelFilter;
use matcalc::{Matrix, Notation, Session};
use std::io::{self, Write};

const HELP: &str = "\
Type an expression to evaluate it, e.g. \"x = a + b * c\".

Commands:
  :mode [infix|prefix]  show or change the notation
  :vars                 list the saved matrices
  :help                 show this message
  :exit                 quit

Use \"?\" in an expression to type a matrix in.";

/// The most entries a matrix typed in with "?" can have.
const MAX_CELLS: usize = 1 << 20;

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("MATCALC_LOG", "error"))
        .init();

    let mut session = Session::new();

    while let Some(line) = prompt(&format!("{}> ", session.notation()))? {
        let line = line.trim();

        match line {
            "" => continue,
            ":exit" | ":quit" => break,
            ":help" => println!("{}", HELP),
            ":vars" => list_variables(&session),
            _ if line.starts_with(":mode") => {
                change_mode(&mut session, line[":mode".len()..].trim())
            },
            _ => evaluate(&mut session, line),
        }
    }

    Ok(())
}

fn evaluate(session: &mut Session, line: &str) {
    if let Some(Ok(prefix)) = session.convert(line) {
        println!("Prefix: {}", prefix);
    }

    let mut input = || match read_matrix() {
        Ok(matrix) => matrix,
        Err(e) => {
            eprintln!("Unable to read the matrix: {:#}", e);
            None
        },
    };

    match session.evaluate(line, &mut input) {
        Ok(matrix) => println!("{}", matrix),
        Err(e) => println!("No result: {}", e),
    }
}

fn change_mode(session: &mut Session, argument: &str) {
    if argument.is_empty() {
        println!("Switched to {} notation", session.toggle_notation());
        return;
    }

    match argument.parse::<Notation>() {
        Ok(notation) => {
            session.set_notation(notation);
            println!("Switched to {} notation", notation);
        },
        Err(e) => eprintln!("{}", e),
    }
}

fn list_variables(session: &Session) {
    let vars = session.variables();

    if vars.is_empty() {
        println!("No matrices have been saved");
        return;
    }

    for name in vars.names() {
        if let Some(matrix) = vars.get(name) {
            let (rows, columns) = matrix.shape();
            println!("{} ({}x{}):\n{}", name, rows, columns, matrix);
        }
    }
}

/// Ask for the dimensions of a matrix, then each of its rows.
fn read_matrix() -> Result<Option<Matrix>> {
    let line = match prompt("rows columns: ")? {
        Some(line) => line,
        None => return Ok(None),
    };

    let dimensions = parse_numbers::<usize>(&line)
        .context("The dimensions should be two positive integers")?;
    let (rows, columns) = match dimensions.as_slice() {
        [rows, columns] if *rows > 0 && *columns > 0 => (*rows, *columns),
        _ => anyhow::bail!("Expected two positive integers, not \"{}\"", line),
    };

    let len = rows
        .checked_mul(columns)
        .filter(|&len| len <= MAX_CELLS)
        .with_context(|| format!("A {}x{} matrix is too big", rows, columns))?;
    let mut cells = Vec::with_capacity(len);

    for row in 0..rows {
        let line = match prompt(&format!("row {}: ", row + 1))? {
            Some(line) => line,
            None => return Ok(None),
        };
        let values = parse_numbers::<f64>(&line)
            .with_context(|| format!("Unable to read row {}", row + 1))?;

        anyhow::ensure!(
            values.len() == columns,
            "Expected {} values but found {}",
            columns,
            values.len()
        );
        cells.extend(values);
    }

    Ok(Matrix::from_row_slice(rows, columns, &cells))
}

fn parse_numbers<T>(line: &str) -> Result<Vec<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    line.split_whitespace()
        .map(|word| {
            word.parse::<T>()
                .with_context(|| format!("\"{}\" isn't a valid number", word))
        })
        .collect()
}

/// Print a prompt and read the next line, returning `None` at the end of
/// input.
fn prompt(message: &str) -> Result<Option<String>> {
    print!("{}", message);
    io::stdout().flush()?;

    let mut line = String::new();
    let bytes_read = io::stdin().read_line(&mut line)?;

    if bytes_read == 0 {
        Ok(None)
    } else {
        Ok(Some(line))
    }
}
