//! Terminal command parsing

use std::fmt;

/// A command typed at the session prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Show the patient list
    List,
    /// Fill the form and submit it as a new patient
    New,
    /// Edit the n-th patient of the list (1-based)
    Edit(usize),
    /// Delete the n-th patient of the list (1-based)
    Delete(usize),
    /// Clear the form and leave edit mode
    Reset,
    Login,
    Logout,
    /// Navigate to a path
    Go(String),
    Help,
    Quit,
}

impl ShellCommand {
    /// Help text, one command per line
    pub const HELP: &'static str = "\
  list          muestra la lista de pacientes
  new           agrega un paciente
  edit <n>      edita el paciente n
  delete <n>    elimina el paciente n
  reset         limpia el formulario
  login         inicia sesión con Google
  logout        cierra sesión
  go <ruta>     navega a /login o /pacientes
  help          muestra esta ayuda
  quit          sale";

    /// True for commands that act on the patient screen
    pub fn needs_patient_screen(&self) -> bool {
        matches!(
            self,
            ShellCommand::List
                | ShellCommand::New
                | ShellCommand::Edit(_)
                | ShellCommand::Delete(_)
                | ShellCommand::Reset
                | ShellCommand::Logout
        )
    }
}

impl fmt::Display for ShellCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShellCommand::List => write!(f, "list"),
            ShellCommand::New => write!(f, "new"),
            ShellCommand::Edit(n) => write!(f, "edit {n}"),
            ShellCommand::Delete(n) => write!(f, "delete {n}"),
            ShellCommand::Reset => write!(f, "reset"),
            ShellCommand::Login => write!(f, "login"),
            ShellCommand::Logout => write!(f, "logout"),
            ShellCommand::Go(path) => write!(f, "go {path}"),
            ShellCommand::Help => write!(f, "help"),
            ShellCommand::Quit => write!(f, "quit"),
        }
    }
}

fn position(command: &str, arg: Option<&str>) -> Result<usize, String> {
    let arg = arg.ok_or_else(|| format!("'{command}' necesita un número de paciente"))?;
    match arg.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("'{arg}' no es un número de paciente válido")),
    }
}

/// Parses one input line
///
/// Commands are case-insensitive; surrounding whitespace is ignored.
///
/// # Errors
///
/// Returns a message for the user when the line is not a command.
pub fn parse_command(line: &str) -> Result<ShellCommand, String> {
    let mut parts = line.split_whitespace();
    let Some(head) = parts.next() else {
        return Err("Escribe un comando (help para ver la lista)".to_string());
    };
    let head = head.to_lowercase();
    let arg = parts.next();

    if parts.next().is_some() {
        return Err(format!("Demasiados argumentos para '{head}'"));
    }

    let command = match head.as_str() {
        "list" | "ls" => ShellCommand::List,
        "new" | "add" => ShellCommand::New,
        "edit" => ShellCommand::Edit(position(&head, arg)?),
        "delete" | "rm" => ShellCommand::Delete(position(&head, arg)?),
        "reset" => ShellCommand::Reset,
        "login" => ShellCommand::Login,
        "logout" => ShellCommand::Logout,
        "go" => ShellCommand::Go(
            arg.ok_or_else(|| "'go' necesita una ruta".to_string())?
                .to_string(),
        ),
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        other => return Err(format!("Comando desconocido: '{other}'")),
    };

    let takes_arg = matches!(
        command,
        ShellCommand::Edit(_) | ShellCommand::Delete(_) | ShellCommand::Go(_)
    );
    if !takes_arg && arg.is_some() {
        return Err(format!("'{head}' no admite argumentos"));
    }

    Ok(command)
}
