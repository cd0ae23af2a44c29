//! Interactive terminal session
//!
//! Hosts the two screens behind a prompt. Entering `/pacientes` creates a
//! [`PatientFormController`] and subscribes it to the list; leaving the
//! screen destroys it.

use super::commands::{parse_command, ShellCommand};
use super::router::{Route, ShellNavigator};
use super::terminal::Terminal;
use crate::adapters::Backend;
use crate::core::controller::PatientFormController;
use crate::core::display::format_email;
use crate::core::form::Field;
use crate::core::login::LoginScreen;
use crate::domain::Patient;
use std::sync::Arc;
use std::time::Duration;

const LIST_WAIT_STEP: Duration = Duration::from_millis(10);
const LIST_WAIT_STEPS: usize = 100;

/// Interactive session over a terminal
pub struct Session {
    terminal: Arc<Terminal>,
    backend: Backend,
    navigator: Arc<ShellNavigator>,
    login: LoginScreen,
    pacientes: Option<PatientFormController>,
}

impl Session {
    /// Session starting at the login screen
    pub fn new(backend: Backend, terminal: Arc<Terminal>) -> Self {
        let navigator = Arc::new(ShellNavigator::default());
        let login = LoginScreen::new(
            Arc::clone(&backend.identity),
            terminal.clone(),
            navigator.clone(),
        );

        Self {
            terminal,
            backend,
            navigator,
            login,
            pacientes: None,
        }
    }

    /// Active screen
    pub fn current_route(&self) -> Route {
        self.navigator.current()
    }

    /// Patient screen controller, while that screen is active
    pub fn controller(&self) -> Option<&PatientFormController> {
        self.pacientes.as_ref()
    }

    /// Reads and runs commands until `quit` or end of input
    pub async fn run(&mut self) {
        self.terminal
            .println("Registro de pacientes. Escribe 'help' para ver los comandos.");

        loop {
            self.sync_screen();

            let Some(line) = self.terminal.prompt(&format!("{} > ", self.current_route())) else {
                break;
            };
            if line.trim().is_empty() {
                continue;
            }

            match parse_command(&line) {
                Ok(ShellCommand::Quit) => break,
                Ok(command) => self.execute(command).await,
                Err(message) => self.terminal.println(&message),
            }
        }

        self.close();
    }

    /// Runs one command
    pub async fn execute(&mut self, command: ShellCommand) {
        tracing::debug!(command = %command, route = %self.current_route(), "Executing command");

        if command.needs_patient_screen() && self.pacientes.is_none() {
            self.terminal
                .println("Ese comando solo está disponible en /pacientes");
            return;
        }

        match command {
            ShellCommand::Help => self.terminal.println(ShellCommand::HELP),
            ShellCommand::Quit => self.close(),
            ShellCommand::Go(path) => {
                if let Err(e) = self.navigator.navigate_path(&path) {
                    self.terminal.println(&e.to_string());
                }
            }
            ShellCommand::Login => {
                self.login.login_with_google().await;
            }
            ShellCommand::Logout => {
                if let Some(ref controller) = self.pacientes {
                    controller.logout().await;
                }
            }
            ShellCommand::List => self.show_list().await,
            ShellCommand::New => self.fill_and_submit(None).await,
            ShellCommand::Edit(n) => match self.patient_at(n).await {
                Some(patient) => self.fill_and_submit(Some(patient)).await,
                None => self.terminal.println(&format!("No existe el paciente {n}")),
            },
            ShellCommand::Delete(n) => match self.patient_at(n).await {
                Some(patient) => {
                    if let Some(ref controller) = self.pacientes {
                        controller.delete_paciente(patient.id).await;
                    }
                }
                None => self.terminal.println(&format!("No existe el paciente {n}")),
            },
            ShellCommand::Reset => {
                if let Some(ref controller) = self.pacientes {
                    controller.reset_form();
                }
            }
        }

        self.sync_screen();
    }

    /// Destroys the patient screen, if open
    pub fn close(&mut self) {
        if let Some(controller) = self.pacientes.take() {
            controller.destroy();
        }
    }

    fn sync_screen(&mut self) {
        match self.current_route() {
            Route::Pacientes if self.pacientes.is_none() => {
                let controller = PatientFormController::new(
                    Arc::clone(&self.backend.store),
                    Arc::clone(&self.backend.identity),
                    self.terminal.clone(),
                    self.navigator.clone(),
                );
                controller.load_pacientes();
                self.pacientes = Some(controller);
            }
            Route::Login => self.close(),
            Route::Pacientes => {}
        }
    }

    async fn patient_at(&self, n: usize) -> Option<Patient> {
        self.wait_for_list().await;
        let controller = self.pacientes.as_ref()?;
        controller.pacientes().into_iter().nth(n.checked_sub(1)?)
    }

    async fn wait_for_list(&self) {
        let Some(ref controller) = self.pacientes else {
            return;
        };
        for _ in 0..LIST_WAIT_STEPS {
            if !controller.is_loading() {
                return;
            }
            tokio::time::sleep(LIST_WAIT_STEP).await;
        }
    }

    async fn show_list(&self) {
        self.wait_for_list().await;
        let Some(ref controller) = self.pacientes else {
            return;
        };

        if controller.is_loading() {
            self.terminal.println("Cargando pacientes...");
            return;
        }

        let pacientes = controller.pacientes();
        if pacientes.is_empty() {
            self.terminal.println("No hay pacientes registrados");
            return;
        }

        let editing = controller.editing_id();
        for (i, patient) in pacientes.iter().enumerate() {
            let marker = if patient.id.is_some() && patient.id == editing {
                " (editando)"
            } else {
                ""
            };
            self.terminal.println(&format!(
                "{:>3}. {} | {} | {} | {}{}",
                i + 1,
                patient.full_name(),
                patient.fecha_nacimiento.to_input_value(),
                patient.domicilio,
                format_email(&patient.correo_electronico),
                marker
            ));
        }
    }

    async fn fill_and_submit(&self, existing: Option<Patient>) {
        let Some(ref controller) = self.pacientes else {
            return;
        };

        if let Some(ref patient) = existing {
            controller.edit_paciente(patient);
        }

        for field in Field::ALL {
            let current = controller.form().value(field).to_string();
            let label = if current.is_empty() {
                format!("{}: ", field.label())
            } else {
                format!("{} [{}]: ", field.label(), current)
            };

            let Some(answer) = self.terminal.prompt(&label) else {
                return;
            };
            if !answer.is_empty() || current.is_empty() {
                controller.set_field(field, answer);
            }
        }

        controller.on_submit().await;

        let form = controller.form();
        for field in Field::ALL {
            if form.shows_errors(field) {
                for error in form.errors(field) {
                    self.terminal
                        .println(&format!("  {}: {}", field.label(), error));
                }
            }
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}
