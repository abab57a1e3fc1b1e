//! Implements InputPort. Inquire-based interactive menus for administrators and students.
//!
//! Business-rule failures (conflicts, duplicates, bad input) are printed and the
//! menu continues.

use crate::domain::calendar::{WEEK, month_name, weekday_label};
use crate::domain::{
    ClassSlot, DomainError, Registration, RegistrationStatus, SlotDraft, SlotId, StudentId,
};
use crate::ports::InputPort;
use crate::usecases::{ClassService, RegistrationService, SettingsService};
use async_trait::async_trait;
use chrono::{NaiveTime, Weekday};
use inquire::ui::{Color, RenderConfig, Styled};
use inquire::{Confirm, CustomType, InquireError, Select, Text};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Applies the prompt theme for all subsequent inquire prompts.
pub fn apply_theme() {
    let config = RenderConfig::default_colored()
        .with_prompt_prefix(Styled::new("›").with_fg(Color::LightCyan))
        .with_highlighted_option_prefix(Styled::new("➜").with_fg(Color::LightGreen));
    inquire::set_global_render_config(config);
}

fn ui_err(e: InquireError) -> DomainError {
    match e {
        InquireError::OperationCanceled | InquireError::OperationInterrupted => {
            DomainError::Cancelled
        }
        other => DomainError::Ui(other.to_string()),
    }
}

#[derive(Debug, Clone, Copy)]
enum MainMenu {
    Admin,
    Student,
    Exit,
}

impl fmt::Display for MainMenu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Admin => "Administrator",
            Self::Student => "Student",
            Self::Exit => "Exit",
        })
    }
}

#[derive(Debug, Clone, Copy)]
enum AdminAction {
    Dashboard,
    ListClasses,
    ClassDetails,
    AddClass,
    EditClass,
    DeleteClass,
    ExportSchedule,
    ReviewRegistrations,
    Settings,
    Back,
}

impl fmt::Display for AdminAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Dashboard => "Dashboard",
            Self::ListClasses => "List classes",
            Self::ClassDetails => "Class details",
            Self::AddClass => "Add class",
            Self::EditClass => "Edit class",
            Self::DeleteClass => "Delete class",
            Self::ExportSchedule => "Export schedule (JSON)",
            Self::ReviewRegistrations => "Review registrations",
            Self::Settings => "Fee settings",
            Self::Back => "Back",
        })
    }
}

#[derive(Debug, Clone, Copy)]
enum StudentAction {
    BrowseClasses,
    ClassDetails,
    QuoteFee,
    RequestRegistration,
    MyRegistrations,
    CancelRegistration,
    Back,
}

impl fmt::Display for StudentAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::BrowseClasses => "Browse classes",
            Self::ClassDetails => "Class details",
            Self::QuoteFee => "Quote monthly fee",
            Self::RequestRegistration => "Request registration",
            Self::MyRegistrations => "My registrations",
            Self::CancelRegistration => "Cancel pending registration",
            Self::Back => "Back",
        })
    }
}

#[derive(Debug, Clone, Copy)]
enum Review {
    Approve,
    Reject,
    Back,
}

impl fmt::Display for Review {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Approve => "Approve",
            Self::Reject => "Reject",
            Self::Back => "Back",
        })
    }
}

#[derive(Debug, Clone, Copy)]
struct StatusFilter(Option<RegistrationStatus>);

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(s) => write!(f, "{}", s),
            None => f.write_str("all"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct DayChoice(Weekday);

impl fmt::Display for DayChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(weekday_label(self.0))
    }
}

#[derive(Debug, Clone, Copy)]
struct MonthChoice(u32);

impl fmt::Display for MonthChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(month_name(self.0))
    }
}

#[derive(Debug, Clone)]
struct ClassChoice(ClassSlot);

impl fmt::Display for ClassChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct RegistrationChoice {
    registration: Registration,
    class: Option<ClassSlot>,
}

impl fmt::Display for RegistrationChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = &self.registration;
        let class = self
            .class
            .as_ref()
            .map(|c| {
                format!(
                    "{} class {}",
                    weekday_label(c.weekday),
                    c.class_number
                )
            })
            .unwrap_or_else(|| format!("class #{}", r.class_id));
        write!(
            f,
            "#{} student {} - {} - {} - fee {:.2} [{}]",
            r.id, r.student_id, class, r.period, r.fee, r.status
        )
    }
}

fn parse_hhmm(s: &str) -> Result<NaiveTime, DomainError> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M")
        .map_err(|_| DomainError::Ui(format!("'{}' is not a time (HH:MM)", s.trim())))
}

fn prompt_time(message: &str, default: Option<NaiveTime>) -> Result<NaiveTime, DomainError> {
    let default = default.map(|t| t.format("%H:%M").to_string());
    let mut prompt = Text::new(message).with_placeholder("HH:MM");
    if let Some(d) = default.as_deref() {
        prompt = prompt.with_default(d);
    }
    parse_hhmm(&prompt.prompt().map_err(ui_err)?)
}

fn prompt_month() -> Result<u32, DomainError> {
    let months: Vec<MonthChoice> = (1..=12).map(MonthChoice).collect();
    Ok(Select::new("Month:", months).prompt().map_err(ui_err)?.0)
}

/// Prompts for all class fields, pre-filled from `current` when editing.
fn prompt_draft(current: Option<&ClassSlot>) -> Result<SlotDraft, DomainError> {
    let mut number = CustomType::<u32>::new("Class number:")
        .with_error_message("Enter a whole number of at least 1");
    if let Some(c) = current {
        number = number.with_default(c.class_number);
    }
    let class_number = number.prompt().map_err(ui_err)?;

    let days: Vec<DayChoice> = WEEK.iter().copied().map(DayChoice).collect();
    let start_day = current
        .and_then(|c| WEEK.iter().position(|d| *d == c.weekday))
        .unwrap_or(0);
    let weekday = Select::new("Day of week:", days)
        .with_starting_cursor(start_day)
        .prompt()
        .map_err(ui_err)?
        .0;

    let start_time = prompt_time("Start time:", current.map(|c| c.start_time))?;
    let end_time = prompt_time("End time:", current.map(|c| c.end_time))?;

    let mut teacher = Text::new("Teacher name:");
    if let Some(c) = current {
        teacher = teacher.with_default(&c.teacher);
    }
    let teacher = teacher.prompt().map_err(ui_err)?;

    Ok(SlotDraft::new(
        class_number,
        weekday,
        start_time,
        end_time,
        teacher,
    )?)
}

fn print_ok(message: impl fmt::Display) {
    println!("✔ {}", message);
}

/// TUI adapter. Inquire prompts.
pub struct TuiInputPort {
    classes: Arc<ClassService>,
    registrations: Arc<RegistrationService>,
    settings: Arc<SettingsService>,
}

impl TuiInputPort {
    pub fn new(
        classes: Arc<ClassService>,
        registrations: Arc<RegistrationService>,
        settings: Arc<SettingsService>,
    ) -> Self {
        Self {
            classes,
            registrations,
            settings,
        }
    }

    /// Lets the user pick one class; None when there are none yet.
    async fn pick_class(&self, message: &str) -> Result<Option<ClassSlot>, DomainError> {
        let choices: Vec<ClassChoice> = self
            .classes
            .classes_by_day()
            .await?
            .into_iter()
            .flat_map(|(_, slots)| slots)
            .map(ClassChoice)
            .collect();
        if choices.is_empty() {
            println!("No classes scheduled yet.");
            return Ok(None);
        }
        let choice = Select::new(message, choices).prompt().map_err(ui_err)?;
        Ok(Some(choice.0))
    }

    async fn class_index(&self) -> Result<HashMap<SlotId, ClassSlot>, DomainError> {
        Ok(self
            .classes
            .classes_by_day()
            .await?
            .into_iter()
            .flat_map(|(_, slots)| slots)
            .map(|s| (s.id, s))
            .collect())
    }

    async fn with_classes(
        &self,
        registrations: Vec<Registration>,
    ) -> Result<Vec<RegistrationChoice>, DomainError> {
        let index = self.class_index().await?;
        Ok(registrations
            .into_iter()
            .map(|registration| RegistrationChoice {
                class: index.get(&registration.class_id).cloned(),
                registration,
            })
            .collect())
    }

    async fn print_classes(&self) -> Result<(), DomainError> {
        let grouped = self.classes.classes_by_day().await?;
        if grouped.is_empty() {
            println!("No classes scheduled yet.");
        }
        for (day, slots) in grouped {
            println!("{}", weekday_label(day));
            for s in slots {
                println!(
                    "  #{:<4} Class {:<3} {}  {}",
                    s.id,
                    s.class_number,
                    s.time_display(),
                    s.teacher
                );
            }
        }
        Ok(())
    }

    async fn admin_menu(&self) -> Result<(), DomainError> {
        let actions = vec![
            AdminAction::Dashboard,
            AdminAction::ListClasses,
            AdminAction::ClassDetails,
            AdminAction::AddClass,
            AdminAction::EditClass,
            AdminAction::DeleteClass,
            AdminAction::ExportSchedule,
            AdminAction::ReviewRegistrations,
            AdminAction::Settings,
            AdminAction::Back,
        ];
        loop {
            let action = match Select::new("Administrator:", actions.clone()).prompt() {
                Ok(a) => a,
                Err(_) => return Ok(()),
            };
            let outcome = match action {
                AdminAction::Dashboard => self.dashboard().await,
                AdminAction::ListClasses => self.print_classes().await,
                AdminAction::ClassDetails => self.class_details().await,
                AdminAction::AddClass => self.add_class().await,
                AdminAction::EditClass => self.edit_class().await,
                AdminAction::DeleteClass => self.delete_class().await,
                AdminAction::ExportSchedule => self.export_schedule().await,
                AdminAction::ReviewRegistrations => self.review_registrations().await,
                AdminAction::Settings => self.fee_settings().await,
                AdminAction::Back => return Ok(()),
            };
            report(outcome);
        }
    }

    async fn dashboard(&self) -> Result<(), DomainError> {
        let summary = self.registrations.dashboard().await?;
        println!(
            "Classes: {}  Students: {}  Pending registrations: {}",
            summary.class_count, summary.student_count, summary.pending_count
        );
        if summary.recent.is_empty() {
            println!("No registrations yet.");
            return Ok(());
        }
        println!("Recent registrations:");
        for choice in self.with_classes(summary.recent).await? {
            println!("  {}", choice);
        }
        Ok(())
    }

    async fn class_details(&self) -> Result<(), DomainError> {
        let Some(slot) = self.pick_class("Class:").await? else {
            return Ok(());
        };
        let details = self.registrations.class_details(slot.id).await?;
        println!("{}", details.class);
        let periods: Vec<String> = details.periods.iter().map(|p| p.to_string()).collect();
        if periods.is_empty() {
            println!("No registrations for this class.");
            return Ok(());
        }
        println!("Months with registrations: {}", periods.join(", "));
        for choice in self.with_classes(details.registrations).await? {
            println!("  {}", choice);
        }
        Ok(())
    }

    async fn add_class(&self) -> Result<(), DomainError> {
        let draft = prompt_draft(None)?;
        let slot = self.classes.create_class(draft).await?;
        print_ok(format_args!(
            "Class {} on {} has been added.",
            slot.class_number,
            weekday_label(slot.weekday)
        ));
        Ok(())
    }

    async fn edit_class(&self) -> Result<(), DomainError> {
        let Some(current) = self.pick_class("Class to edit:").await? else {
            return Ok(());
        };
        let draft = prompt_draft(Some(&current))?;
        let slot = self.classes.edit_class(current.id, draft).await?;
        print_ok(format_args!("Class {} has been updated.", slot.class_number));
        Ok(())
    }

    async fn delete_class(&self) -> Result<(), DomainError> {
        let Some(slot) = self.pick_class("Class to delete:").await? else {
            return Ok(());
        };
        let confirmed = Confirm::new(&format!(
            "Delete {}? Its registrations are removed too.",
            slot
        ))
        .with_default(false)
        .prompt()
        .map_err(ui_err)?;
        if confirmed {
            let slot = self.classes.delete_class(slot.id).await?;
            print_ok(format_args!(
                "Class {} on {} has been deleted.",
                slot.class_number,
                weekday_label(slot.weekday)
            ));
        }
        Ok(())
    }

    async fn export_schedule(&self) -> Result<(), DomainError> {
        let feed = self.classes.schedule_feed().await?;
        let json = serde_json::to_string_pretty(&feed)
            .map_err(|e| DomainError::Ui(format!("serialize schedule: {}", e)))?;
        println!("{}", json);
        Ok(())
    }

    async fn review_registrations(&self) -> Result<(), DomainError> {
        let filters = vec![
            StatusFilter(Some(RegistrationStatus::Pending)),
            StatusFilter(None),
            StatusFilter(Some(RegistrationStatus::Approved)),
            StatusFilter(Some(RegistrationStatus::Rejected)),
        ];
        let filter = Select::new("Show registrations:", filters)
            .prompt()
            .map_err(ui_err)?;
        let listed = self.registrations.registrations(filter.0).await?;
        if listed.is_empty() {
            println!("No {} registrations.", filter);
            return Ok(());
        }
        let choices = self.with_classes(listed).await?;
        let picked = Select::new("Registration:", choices)
            .prompt()
            .map_err(ui_err)?;
        let id = picked.registration.id;
        match Select::new(
            "Decision:",
            vec![Review::Approve, Review::Reject, Review::Back],
        )
        .prompt()
        .map_err(ui_err)?
        {
            Review::Approve => {
                self.registrations.approve(id).await?;
                print_ok(format_args!("Registration #{} has been approved.", id));
            }
            Review::Reject => {
                self.registrations.reject(id).await?;
                print_ok(format_args!("Registration #{} has been rejected.", id));
            }
            Review::Back => {}
        }
        Ok(())
    }

    async fn fee_settings(&self) -> Result<(), DomainError> {
        let current = self.settings.current().await?;
        println!(
            "Reference year {}, fee per session {:.2}",
            current.year, current.fee_per_session
        );
        let fee = CustomType::<Decimal>::new("New fee per session:")
            .with_default(current.fee_per_session)
            .with_error_message("Enter an amount such as 50.00")
            .prompt()
            .map_err(ui_err)?;
        let updated = self.settings.update_fee(fee).await?;
        print_ok(format_args!(
            "Settings updated: {:.2} per session.",
            updated.fee_per_session
        ));
        Ok(())
    }

    async fn student_menu(&self) -> Result<(), DomainError> {
        let student_id = StudentId(
            CustomType::<i64>::new("Student ID:")
                .with_error_message("Enter your numeric student ID")
                .prompt()
                .map_err(ui_err)?,
        );
        let actions = vec![
            StudentAction::BrowseClasses,
            StudentAction::ClassDetails,
            StudentAction::QuoteFee,
            StudentAction::RequestRegistration,
            StudentAction::MyRegistrations,
            StudentAction::CancelRegistration,
            StudentAction::Back,
        ];
        loop {
            let action = match Select::new("Student:", actions.clone()).prompt() {
                Ok(a) => a,
                Err(_) => return Ok(()),
            };
            let outcome = match action {
                StudentAction::BrowseClasses => self.print_classes().await,
                StudentAction::ClassDetails => self.class_details().await,
                StudentAction::QuoteFee => self.quote_fee().await,
                StudentAction::RequestRegistration => self.request_registration(student_id).await,
                StudentAction::MyRegistrations => self.my_registrations(student_id).await,
                StudentAction::CancelRegistration => self.cancel_registration(student_id).await,
                StudentAction::Back => return Ok(()),
            };
            report(outcome);
        }
    }

    async fn quote_fee(&self) -> Result<(), DomainError> {
        let Some(slot) = self.pick_class("Class:").await? else {
            return Ok(());
        };
        let month = prompt_month()?;
        let (period, quote) = self.registrations.quote_fee(slot.id, month).await?;
        println!(
            "{}: {} sessions x {:.2} = {:.2}",
            period, quote.session_count, quote.fee_per_session, quote.total_fee
        );
        Ok(())
    }

    async fn request_registration(&self, student_id: StudentId) -> Result<(), DomainError> {
        let Some(slot) = self.pick_class("Class:").await? else {
            return Ok(());
        };
        let month = prompt_month()?;
        let registration = self
            .registrations
            .request_registration(student_id, slot.id, month)
            .await?;
        print_ok(format_args!(
            "Registration request submitted for approval. Fee: {:.2}",
            registration.fee
        ));
        Ok(())
    }

    async fn my_registrations(&self, student_id: StudentId) -> Result<(), DomainError> {
        let overview = self.registrations.student_overview(student_id).await?;
        for (label, group) in [
            ("Approved", overview.approved),
            ("Pending", overview.pending),
            ("Rejected", overview.rejected),
        ] {
            println!("{} ({})", label, group.len());
            for choice in self.with_classes(group).await? {
                println!("  {}", choice);
            }
        }
        Ok(())
    }

    async fn cancel_registration(&self, student_id: StudentId) -> Result<(), DomainError> {
        let pending = self.registrations.student_overview(student_id).await?.pending;
        if pending.is_empty() {
            println!("No pending registrations.");
            return Ok(());
        }
        let choices = self.with_classes(pending).await?;
        let picked = Select::new("Cancel which request?", choices)
            .prompt()
            .map_err(ui_err)?;
        self.registrations
            .cancel(student_id, picked.registration.id)
            .await?;
        print_ok("Registration request cancelled successfully.");
        Ok(())
    }
}

/// Line shown for a failed menu action. Backing out of a prompt shows nothing.
fn failure_line(e: &DomainError) -> Option<String> {
    match e {
        DomainError::Cancelled => None,
        e => Some(format!("✘ {}", e)),
    }
}

/// Prints the failure of one menu action; the menu keeps running.
fn report(outcome: Result<(), DomainError>) {
    let Err(e) = outcome else {
        return;
    };
    match failure_line(&e) {
        Some(line) => {
            warn!(error = %e, "menu action failed");
            println!("{}", line);
        }
        None => debug!("prompt cancelled"),
    }
}

#[async_trait]
impl InputPort for TuiInputPort {
    async fn run(&self) -> Result<(), DomainError> {
        loop {
            let choice = match Select::new(
                "Main menu:",
                vec![MainMenu::Admin, MainMenu::Student, MainMenu::Exit],
            )
            .prompt()
            {
                Ok(c) => c,
                Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                    return Ok(());
                }
                Err(e) => return Err(ui_err(e)),
            };
            match choice {
                MainMenu::Admin => self.admin_menu().await?,
                MainMenu::Student => report(self.student_menu().await),
                MainMenu::Exit => return Ok(()),
            }
        }
    }
}
