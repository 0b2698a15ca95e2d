//! Runs one parsed command against a user's stored document.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, FixedOffset, Utc};
use tracing::{debug, info};

use mandala_config::Settings;
use mandala_core::reminder::{REMINDER_BODY, REMINDER_TITLE, is_due};
use mandala_core::{Applied, Edit, ProgressionEngine, TreeEditor, respond};
use mandala_markdown::{Imported, MandalaImport, Vault};
use mandala_store::{DocumentStore, load_or_default, update};
use mandala_types::{Document, NonEmptyString, UserId};

use crate::commands::{Command, ExportTarget, ImportTarget, help_text};
use crate::view::render_overview;

pub struct App<S> {
    store: S,
    user: UserId,
    settings: Settings,
    editor: TreeEditor,
}

impl<S: DocumentStore> App<S> {
    pub fn new(store: S, user: UserId, settings: Settings) -> Self {
        let editor = TreeEditor::new(ProgressionEngine::new(settings.progression()));
        Self {
            store,
            user,
            settings,
            editor,
        }
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    fn local(&self, now: DateTime<Utc>) -> DateTime<FixedOffset> {
        now.with_timezone(&self.settings.progression().offset())
    }

    fn vault(&self, document: &Document) -> Vault {
        Vault::new(self.settings.export_dir(document))
    }

    /// Run `command` and return the text to print.
    pub fn run(&self, command: &Command<'_>, now: DateTime<Utc>) -> Result<String> {
        debug!(user = %self.user, ?command, "Running command");

        match command {
            Command::Show => {
                let document = self.load()?;
                Ok(render_overview(&document))
            }
            Command::Add {
                section_id,
                cell_id,
                title,
            } => self.edit(
                Edit::AddSubTask {
                    section_id: (*section_id).to_string(),
                    cell_id: (*cell_id).to_string(),
                    title: NonEmptyString::new(title.as_str())?,
                },
                now,
            ),
            Command::Toggle {
                section_id,
                cell_id,
                sub_task_id,
            } => self.edit(
                Edit::ToggleSubTask {
                    section_id: (*section_id).to_string(),
                    cell_id: (*cell_id).to_string(),
                    sub_task_id: (*sub_task_id).to_string(),
                },
                now,
            ),
            Command::Edit {
                section_id,
                cell_id,
                sub_task_id,
                title,
            } => self.edit(
                Edit::EditSubTask {
                    section_id: (*section_id).to_string(),
                    cell_id: (*cell_id).to_string(),
                    sub_task_id: (*sub_task_id).to_string(),
                    title: NonEmptyString::new(title.as_str())?,
                },
                now,
            ),
            Command::Remove {
                section_id,
                cell_id,
                sub_task_id,
            } => self.edit(
                Edit::DeleteSubTask {
                    section_id: (*section_id).to_string(),
                    cell_id: (*cell_id).to_string(),
                    sub_task_id: (*sub_task_id).to_string(),
                },
                now,
            ),
            Command::Rename {
                section_id,
                cell_id,
                title,
            } => self.edit(
                Edit::RetitleCell {
                    section_id: (*section_id).to_string(),
                    cell_id: (*cell_id).to_string(),
                    title: NonEmptyString::new(title.as_str())?,
                },
                now,
            ),
            Command::Done(text) => self.done(text, now),
            Command::Export(target) => self.export(*target, now),
            Command::Import(target) => self.import(*target, now),
            Command::Due => self.due(now),
            Command::Help => Ok(help_text()),
            Command::Usage(usage) => bail!("usage: mandala {usage}"),
            Command::Unknown(verb) => bail!("unknown command {verb:?}; run `mandala help`"),
        }
    }

    fn load(&self) -> Result<Document> {
        load_or_default(&self.store, &self.user)
            .with_context(|| format!("failed to load document for {}", self.user))
    }

    fn update<T>(&self, mutate: impl FnOnce(&mut Document) -> T) -> Result<(Document, T)> {
        update(&self.store, &self.user, mutate)
            .with_context(|| format!("failed to update document for {}", self.user))
    }

    fn edit(&self, edit: Edit, now: DateTime<Utc>) -> Result<String> {
        let (document, applied) = self.update(|document| self.editor.apply(document, &edit, now))?;
        let applied = applied?;

        let mut out = describe(&applied);
        self.auto_sync(&document, now, &mut out)?;
        Ok(out)
    }

    fn done(&self, text: &str, now: DateTime<Utc>) -> Result<String> {
        let (document, reply) =
            self.update(|document| respond(document, text, now, self.editor.engine()))?;

        let mut out = reply.text;
        if reply.changed {
            self.auto_sync(&document, now, &mut out)?;
        }
        Ok(out)
    }

    /// Re-export both documents when the user opted into automatic sync.
    fn auto_sync(&self, document: &Document, now: DateTime<Utc>, out: &mut String) -> Result<()> {
        if !document
            .interchange
            .as_ref()
            .is_some_and(|interchange| interchange.auto_sync)
        {
            return Ok(());
        }
        for path in self.write_exports(document, ExportTarget::All, now)? {
            out.push_str(&format!("\nSynced {}", path.display()));
        }
        Ok(())
    }

    fn write_exports(
        &self,
        document: &Document,
        target: ExportTarget,
        now: DateTime<Utc>,
    ) -> Result<Vec<PathBuf>> {
        let vault = self.vault(document);
        let local = self.local(now);
        let mut written = Vec::new();
        if matches!(target, ExportTarget::Mandala | ExportTarget::All) {
            written.push(vault.export_mandala(document, local)?);
        }
        if matches!(target, ExportTarget::Tasks | ExportTarget::All) {
            written.push(vault.export_tasks(document, local)?);
        }
        Ok(written)
    }

    fn export(&self, target: ExportTarget, now: DateTime<Utc>) -> Result<String> {
        let document = self.load()?;
        let written = self.write_exports(&document, target, now)?;
        Ok(written
            .iter()
            .map(|path| format!("Exported {}", path.display()))
            .collect::<Vec<_>>()
            .join("\n"))
    }

    fn import(&self, target: ImportTarget, now: DateTime<Utc>) -> Result<String> {
        match target {
            ImportTarget::Mandala => {
                let (document, imported) = self.update(|document| {
                    self.vault(document).import_mandala(&mut document.goal_tree)
                })?;
                Ok(match imported? {
                    None => self.nothing_to_import(&document, "mandala"),
                    Some(Imported {
                        path,
                        outcome: MandalaImport::Empty,
                    }) => format!("Nothing to import from {}", path.display()),
                    Some(Imported {
                        path,
                        outcome:
                            MandalaImport::Applied {
                                vision,
                                themes,
                                means,
                            },
                    }) => {
                        let vision = if vision { "the vision, " } else { "" };
                        format!(
                            "Imported {vision}{themes} theme(s) and {means} means cell(s) from {}",
                            path.display()
                        )
                    }
                })
            }
            ImportTarget::Tasks => {
                let (document, imported) = self.update(|document| {
                    self.vault(document)
                        .import_tasks(&mut document.goal_tree, now)
                })?;
                Ok(match imported? {
                    None => self.nothing_to_import(&document, "tasks"),
                    Some(Imported { path, outcome }) => format!(
                        "Imported {} task(s), skipped {} from {}",
                        outcome.imported,
                        outcome.skipped,
                        path.display()
                    ),
                })
            }
        }
    }

    fn nothing_to_import(&self, document: &Document, kind: &str) -> String {
        format!(
            "No {kind}-*.md file in {}",
            self.settings.export_dir(document).display()
        )
    }

    fn due(&self, now: DateTime<Utc>) -> Result<String> {
        let Some(schedule) = self.settings.reminders() else {
            return Ok("Reminders are disabled.".to_string());
        };
        let offset = self.settings.progression().offset();

        let (_, due) = self.update(|document| {
            let due = is_due(&schedule, now, offset, document.reminders.last_sent_at);
            if due {
                document.reminders.last_sent_at = Some(now);
            }
            due
        })?;

        if due {
            info!(user = %self.user, "Reminder due");
            Ok(format!("{REMINDER_TITLE}\n{REMINDER_BODY}"))
        } else {
            Ok("No reminder due.".to_string())
        }
    }
}

fn describe(applied: &Applied) -> String {
    match applied {
        Applied::Added { sub_task_id } => format!("Added sub-task {sub_task_id}"),
        Applied::Completed(report) => {
            let mut out = format!(
                "Completed (+{} XP, streak {} day(s))",
                report.xp_gained, report.streak_days
            );
            if let Some(level) = report.new_level {
                out.push_str(&format!("\nLevel up! Now level {level}"));
            }
            out
        }
        Applied::Reopened { refunded_xp } => format!("Reopened (-{refunded_xp} XP)"),
        Applied::Edited => "Updated sub-task".to_string(),
        Applied::Deleted { refunded_xp: 0 } => "Deleted sub-task".to_string(),
        Applied::Deleted { refunded_xp } => format!("Deleted sub-task (-{refunded_xp} XP)"),
        Applied::Retitled => "Renamed cell".to_string(),
    }
}
