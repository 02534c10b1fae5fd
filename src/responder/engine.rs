//! Responder engine - decides replies to customers and applies operator commands.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::responder::channels::{CustomerChannel, OperatorChannel};
use crate::responder::commands::Command;
use crate::responder::database::{AddOutcome, Database};
use crate::responder::format;
use crate::responder::schedule::{Clock, TIME_FORMAT, WorkSchedule};
use crate::responder::settings;

/// What happened to an inbound customer message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundOutcome {
    /// Bot is switched off; logged and forwarded only.
    Inactive,
    /// Outside working hours; the after-hours message was sent.
    AfterHours,
    /// A keyword matched; its response was sent.
    AutoReply,
    /// Nothing matched; the greeting was sent.
    Greeting,
}

pub struct Responder {
    db: Database,
    operator: Arc<dyn OperatorChannel>,
    customer: Arc<dyn CustomerChannel>,
    operator_chat_id: i64,
    clock: Clock,
}

impl Responder {
    pub fn new(
        db: Database,
        operator: Arc<dyn OperatorChannel>,
        customer: Arc<dyn CustomerChannel>,
        operator_chat_id: i64,
        clock: Clock,
    ) -> Self {
        Self {
            db,
            operator,
            customer,
            operator_chat_id,
            clock,
        }
    }

    #[cfg(test)]
    pub fn database(&self) -> &Database {
        &self.db
    }

    // ==================== CUSTOMER SIDE ====================

    /// Log, forward to the operator, then send at most one reply.
    pub async fn handle_inbound(&self, sender: &str, text: &str) -> Result<InboundOutcome, StoreError> {
        let now = self.clock.now();
        let preview: String = text.chars().take(100).collect();
        info!("📨 WhatsApp from {sender}: \"{preview}\"");

        self.db
            .save_message(sender, text, &now.format("%Y-%m-%dT%H:%M:%S%.6f").to_string())?;
        self.notify_operator(&format::inbound_notification(sender, text)).await;

        let settings = self.db.settings()?;
        if !settings.bot_active {
            debug!("Bot inactive, not replying to {sender}");
            return Ok(InboundOutcome::Inactive);
        }

        let schedule = WorkSchedule::from_settings(&settings);
        if !schedule.contains(now) {
            self.reply(sender, &settings.after_hours_msg).await;
            return Ok(InboundOutcome::AfterHours);
        }

        if let Some(response) = self.db.find_auto_reply(text)? {
            self.reply(sender, &response).await;
            return Ok(InboundOutcome::AutoReply);
        }

        self.reply(sender, &settings.greeting).await;
        Ok(InboundOutcome::Greeting)
    }

    async fn reply(&self, to: &str, text: &str) {
        if let Err(e) = self.customer.send(to, text).await {
            warn!("Failed to reply to {to}: {e}");
        }
    }

    async fn notify_operator(&self, text: &str) {
        if let Err(e) = self.operator.notify(text).await {
            warn!("Failed to notify operator: {e}");
        }
    }

    // ==================== OPERATOR SIDE ====================

    /// Apply an operator command. Returns `false` without doing anything
    /// when `chat_id` is not the operator's chat.
    pub async fn handle_admin(&self, chat_id: i64, text: &str) -> Result<bool, StoreError> {
        if chat_id != self.operator_chat_id {
            debug!("Ignoring message from non-operator chat {chat_id}");
            return Ok(false);
        }

        let command = Command::parse(text);
        info!("🛠️ Operator command: {:?}", command);
        for reply in self.execute(command)? {
            self.notify_operator(&reply).await;
        }
        Ok(true)
    }

    /// Run a command and build the operator's reply, which may span several
    /// messages.
    fn execute(&self, command: Command) -> Result<Vec<String>, StoreError> {
        let reply = match command {
            Command::Start => format::HELP.to_string(),
            Command::Add(None) => format::ADD_FORMAT_ERROR.to_string(),
            Command::Add(Some((keyword, response))) => {
                match self.db.add_auto_reply(&keyword, &response)? {
                    AddOutcome::Added => format::auto_reply_added(&keyword, &response),
                    AddOutcome::Duplicate => format::auto_reply_exists(&keyword),
                }
            }
            Command::List => return Ok(format::auto_reply_list(&self.db.list_auto_replies()?)),
            Command::Delete(keyword) => {
                self.db.delete_auto_reply(&keyword)?;
                format::auto_reply_deleted(&keyword)
            }
            Command::Greeting(text) => {
                self.db.set_setting(settings::GREETING, &text)?;
                format::greeting_changed(&text)
            }
            Command::On => {
                self.db.set_setting(settings::BOT_ACTIVE, "true")?;
                format::BOT_ON.to_string()
            }
            Command::Off => {
                self.db.set_setting(settings::BOT_ACTIVE, "false")?;
                format::BOT_OFF.to_string()
            }
            Command::Stats => {
                let stored = self.db.get_setting(settings::BOT_ACTIVE)?;
                let active = stored.as_deref().or(settings::default_for(settings::BOT_ACTIVE))
                    == Some("true");
                format::stats(active, &self.db.stats()?)
            }
            Command::Schedule => format::SCHEDULE_HELP.to_string(),
            Command::SetHours(None) => format::HOURS_FORMAT_ERROR.to_string(),
            Command::SetHours(Some((start, end))) => {
                let (start_s, end_s) = (
                    start.format(TIME_FORMAT).to_string(),
                    end.format(TIME_FORMAT).to_string(),
                );
                self.db.set_settings(&[
                    (settings::WORK_START, start_s.as_str()),
                    (settings::WORK_END, end_s.as_str()),
                ])?;
                if end < start {
                    info!("Working hours {start_s}-{end_s} wrap past midnight");
                }
                format::hours_changed(start, end)
            }
            Command::SetDays(days) => {
                self.db.set_setting(settings::WORKING_DAYS, &days)?;
                format::days_changed(&days)
            }
            Command::AfterHours(text) => {
                self.db.set_setting(settings::AFTER_HOURS_MSG, &text)?;
                format::after_hours_changed(&text)
            }
            Command::Unknown => format::UNKNOWN_COMMAND.to_string(),
        };
        Ok(vec![reply])
    }
}
