//! Operator-facing texts. Everything here is sent with HTML parse mode.
//!
//! Telegram limits the *visible* text of a message, after entities are
//! parsed. User-supplied text is clipped before it is escaped so that a
//! message never has to be cut once it contains markup.

use std::borrow::Cow;

use chrono::NaiveTime;

use crate::responder::database::{AutoReply, Stats};
use crate::responder::schedule::TIME_FORMAT;

pub const HELP: &str = "🤖 <b>WhatsApp Бот - Панель управления</b>

Доступные команды:

📝 <b>Автоответы:</b>
/add [ключевое_слово] | [ответ] - добавить автоответ
/list - список всех автоответов
/delete [ключевое_слово] - удалить автоответ

⚙️ <b>Настройки:</b>
/greeting [текст] - изменить приветствие
/schedule - настроить рабочее время
/on - включить бота
/off - выключить бота

📊 <b>Статистика:</b>
/stats - посмотреть статистику

💡 <b>Примеры:</b>
/add цена | Наши цены начинаются от 1000₽
/greeting Добро пожаловать в наш магазин!";

pub const SCHEDULE_HELP: &str = "⏰ <b>Настройка рабочего времени</b>

Используй команды:
/set_hours [начало] [конец] - например: /set_hours 09:00 18:00
/set_days [дни] - например: /set_days 1,2,3,4,5 (Пн-Пт)
/after_hours [текст] - сообщение вне рабочего времени

Дни недели: 1=Пн, 2=Вт, 3=Ср, 4=Чт, 5=Пт, 6=Сб, 7=Вс";

pub const ADD_FORMAT_ERROR: &str = "❌ Неверный формат. Используй:\n/add ключевое_слово | ответ";
pub const HOURS_FORMAT_ERROR: &str = "❌ Формат: /set_hours 09:00 18:00";
pub const NO_AUTO_REPLIES: &str = "Автоответов пока нет.";
pub const BOT_ON: &str = "✅ Бот включен";
pub const BOT_OFF: &str = "✅ Бот выключен";
pub const UNKNOWN_COMMAND: &str = "❓ Неизвестная команда. Используй /start для списка команд.";

/// Longest visible text Telegram accepts in one message, in UTF-16 units.
pub const MAX_MESSAGE_LEN: usize = 4096;
/// Budget for one piece of quoted user text (message body, greeting, response).
const MAX_QUOTED_LEN: usize = 3500;
/// Budget for short quoted values such as senders and keywords.
const MAX_LABEL_LEN: usize = 200;

/// Length as Telegram counts it.
fn visible_len(s: &str) -> usize {
    s.encode_utf16().count()
}

/// Cut raw text to at most `max` UTF-16 units, marking the cut with `…`.
pub fn clip(text: &str, max: usize) -> Cow<'_, str> {
    if visible_len(text) <= max {
        return Cow::Borrowed(text);
    }
    let mut out = String::new();
    let mut len = 0;
    for c in text.chars() {
        if len + c.len_utf16() > max - 1 {
            break;
        }
        len += c.len_utf16();
        out.push(c);
    }
    out.push('…');
    Cow::Owned(out)
}

fn quote(text: &str) -> String {
    escape_html(&clip(text, MAX_QUOTED_LEN))
}

fn label(text: &str) -> String {
    escape_html(&clip(text, MAX_LABEL_LEN))
}

/// Escape text for Telegram HTML parse mode.
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '&' => result.push_str("&amp;"),
            _ => result.push(c),
        }
    }
    result
}

pub fn inbound_notification(sender: &str, text: &str) -> String {
    format!(
        "📱 <b>Новое сообщение WhatsApp</b>\nОт: {}\nТекст: {}",
        label(sender),
        quote(text)
    )
}

pub fn auto_reply_added(keyword: &str, response: &str) -> String {
    format!(
        "✅ Автоответ добавлен!\nКлюч: {}\nОтвет: {}",
        label(keyword),
        quote(response)
    )
}

pub fn auto_reply_exists(keyword: &str) -> String {
    format!(
        "❌ Ключевое слово '{}' уже существует. Удалите его сначала.",
        label(keyword)
    )
}

pub fn auto_reply_deleted(keyword: &str) -> String {
    format!("✅ Автоответ '{}' удален", label(keyword))
}

/// The auto-reply list, split into as many messages as needed. Entries
/// are never split across messages.
pub fn auto_reply_list(replies: &[AutoReply]) -> Vec<String> {
    if replies.is_empty() {
        return vec![NO_AUTO_REPLIES.to_string()];
    }

    let mut messages = Vec::new();
    let mut current = String::from("📋 <b>Список автоответов:</b>\n\n");
    let mut current_len = visible_len("📋 Список автоответов:\n\n");

    for reply in replies {
        let keyword = clip(&reply.keyword, MAX_LABEL_LEN);
        let response = clip(&reply.response, MAX_QUOTED_LEN);
        let entry_len = visible_len(&format!("🔹 {keyword}\n   → {response}\n\n"));

        if current_len + entry_len > MAX_MESSAGE_LEN {
            messages.push(std::mem::take(&mut current));
            current_len = 0;
        }
        current.push_str(&format!(
            "🔹 <b>{}</b>\n   → {}\n\n",
            escape_html(&keyword),
            escape_html(&response)
        ));
        current_len += entry_len;
    }
    messages.push(current);
    messages
}

pub fn greeting_changed(greeting: &str) -> String {
    format!("✅ Приветствие изменено на:\n{}", quote(greeting))
}

pub fn stats(bot_active: bool, stats: &Stats) -> String {
    let status = if bot_active { "🟢 Включен" } else { "🔴 Выключен" };
    format!(
        "📊 <b>Статистика бота</b>\n\nСтатус: {status}\nВсего сообщений: {}\nУникальных пользователей: {}\nАвтоответов: {}",
        stats.total_messages, stats.unique_senders, stats.auto_replies
    )
}

pub fn hours_changed(start: NaiveTime, end: NaiveTime) -> String {
    format!(
        "✅ Рабочее время: {} - {}",
        start.format(TIME_FORMAT),
        end.format(TIME_FORMAT)
    )
}

pub fn days_changed(days: &str) -> String {
    format!("✅ Рабочие дни установлены: {}", quote(days))
}

pub fn after_hours_changed(msg: &str) -> String {
    format!("✅ Сообщение вне рабочего времени:\n{}", quote(msg))
}
