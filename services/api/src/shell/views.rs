//! services/api/src/shell/views.rs
//!
//! Plain-text renderings of each screen. Views only read [`ShellState`]; all
//! changes go through the controller.

use std::fmt::Write;

use word_pocket_core::domain::{
    GeneratedText, LengthPreference, TextType, User, Word, LANGUAGES,
};
use word_pocket_core::interactive_text::{plain_text, segment, TextSegment};
use word_pocket_core::word_bag::{Particle, CENTER, DISPLAY_LIMIT, MAX_RADIUS};

use super::controller::{AppView, ShellState};

const RULE: &str = "────────────────────────────────────────────────────────";
const RECENT_LIMIT: usize = 3;
const PREVIEW_CHARS: usize = 90;
const ORB_COLUMNS: usize = 56;
const ORB_ROWS: usize = 24;

/// First eight characters of an id, enough to address it from the CLI.
pub fn short_id(id: &uuid::Uuid) -> String {
    id.to_string()[..8].to_string()
}

fn preview(content: &str) -> String {
    let flat = plain_text(content).replace('\n', " ");
    if flat.chars().count() <= PREVIEW_CHARS {
        flat
    } else {
        let cut: String = flat.chars().take(PREVIEW_CHARS).collect();
        format!("{}…", cut.trim_end())
    }
}

/// Renders whatever screen the state points at.
pub fn render(state: &ShellState) -> String {
    let user = match (&state.view, &state.user) {
        (AppView::Landing, _) | (_, None) => return render_landing(),
        (_, Some(user)) => user,
    };
    match state.view {
        AppView::Landing => render_landing(),
        AppView::Dashboard => render_dashboard(user, &state.words, &state.texts),
        AppView::WordBag => match state.active_word() {
            Some(word) => render_word_detail(word),
            None => render_word_bag(&state.words),
        },
        AppView::Generate => render_generate(&state.words),
        AppView::MyTexts => render_my_texts(&state.texts),
        AppView::TextDetail => match state.active_text() {
            Some(text) => render_text_detail(text, &state.words),
            None => render_my_texts(&state.texts),
        },
    }
}

pub fn render_landing() -> String {
    let mut out = String::new();
    let _ = writeln!(out, "WordPocket");
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "Transform Your Vocabulary Into Fluency.");
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Store words you learn in your pocket, and let AI weave them into\n\
         personalized stories, dialogs, and paragraphs instantly."
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "Get started free:  wordpocket login name@example.com");
    out
}

pub fn render_dashboard(user: &User, words: &[Word], texts: &[GeneratedText]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Welcome back, {}", user.name);
    let _ = writeln!(out, "Your daily progress overview.");
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "Total Words: {:<8}  Stories Created: {}", words.len(), texts.len());
    let _ = writeln!(out, "Practice now: wordpocket generate --all");
    let _ = writeln!(out);

    let _ = writeln!(out, "Recent Words");
    if words.is_empty() {
        let _ = writeln!(out, "  No words yet. Add some to get started!");
    }
    for word in words.iter().take(RECENT_LIMIT) {
        let _ = writeln!(
            out,
            "  {:<24} {:<12} {}",
            word.word,
            word.language,
            word.created_at.format("%Y-%m-%d")
        );
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "Recent Stories");
    if texts.is_empty() {
        let _ = writeln!(out, "  No stories yet.");
    }
    for text in texts.iter().take(RECENT_LIMIT) {
        let _ = writeln!(out, "  {} [{}]", text.title, text.text_type);
        let _ = writeln!(out, "    {}", preview(&text.content));
    }
    out
}

pub fn render_word_bag(words: &[Word]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Word Bag ({} words)", words.len());
    let _ = writeln!(out, "{RULE}");
    if words.is_empty() {
        let _ = writeln!(out, "Your Bag is Empty");
        let _ = writeln!(out, "Add words to see them float here!  wordpocket add <word>");
        return out;
    }
    let overflow = words.len().saturating_sub(DISPLAY_LIMIT);
    let _ = writeln!(
        out,
        "{} floating in the orb (wordpocket bag)",
        words.len().min(DISPLAY_LIMIT)
    );
    if overflow > 0 {
        let _ = writeln!(out, "+ {overflow} more below");
    }
    let _ = writeln!(out);
    for word in words {
        let _ = writeln!(
            out,
            "{}  {:<24} {:<12} {}",
            short_id(&word.id),
            word.word,
            word.language,
            word.translation.as_deref().unwrap_or("-")
        );
    }
    out
}

pub fn render_word_detail(word: &Word) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}  ({})", word.word, word.language);
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(
        out,
        "Definition: {}",
        word.translation.as_deref().unwrap_or("No definition saved.")
    );
    if let Some(example) = &word.example_sentence {
        let _ = writeln!(out, "Example:    \"{example}\"");
    }
    let _ = writeln!(out, "Added:      {}", word.created_at.format("%Y-%m-%d %H:%M"));
    let _ = writeln!(out, "Id:         {}", word.id);
    out
}

pub fn render_generate(words: &[Word]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Generate");
    let _ = writeln!(out, "Configure your practice session.");
    let _ = writeln!(out, "{RULE}");
    let formats: Vec<&str> = TextType::ALL.iter().map(|t| t.label()).collect();
    let _ = writeln!(out, "Format:          {}", formats.join(" | "));
    let languages: Vec<&str> = LANGUAGES.iter().map(|(name, _)| *name).collect();
    let _ = writeln!(out, "Target Language: {}", languages.join(", "));
    let lengths: Vec<String> = LengthPreference::ALL
        .iter()
        .map(|l| format!("{} ({})", l, l.word_band()))
        .collect();
    let _ = writeln!(out, "Length:          {}", lengths.join(", "));
    let _ = writeln!(out);
    let _ = writeln!(out, "Select words ({} available):", words.len());
    if words.is_empty() {
        let _ = writeln!(out, "  Your bag is empty. Add words first.");
    }
    for word in words {
        let _ = writeln!(out, "  [ ] {}  {}", short_id(&word.id), word.word);
    }
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Run: wordpocket generate --words <id|word>... [--format Dialog] [--language Spanish] [--length short]"
    );
    out
}

pub fn render_my_texts(texts: &[GeneratedText]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "My Texts ({})", texts.len());
    let _ = writeln!(out, "{RULE}");
    if texts.is_empty() {
        let _ = writeln!(out, "No stories yet.");
    }
    for text in texts {
        let _ = writeln!(
            out,
            "{}  {} [{} · {}] {}",
            short_id(&text.id),
            text.title,
            text.text_type,
            text.language,
            text.created_at.format("%Y-%m-%d")
        );
        let _ = writeln!(out, "          {}", preview(&text.content));
    }
    out
}

/// The text with vocabulary chips marked `[word]¹` and their popups listed below.
pub fn render_text_detail(text: &GeneratedText, words: &[Word]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", text.title);
    let _ = writeln!(
        out,
        "{} · {} · {}",
        text.text_type,
        text.language,
        text.created_at.format("%Y-%m-%d")
    );
    let _ = writeln!(out, "{RULE}");

    let mut popups = Vec::new();
    for part in segment(&text.content, words) {
        match &part {
            TextSegment::Plain(plain) => out.push_str(plain),
            TextSegment::Highlight { token, .. } => {
                if let Some(popup) = part.popup() {
                    popups.push(popup);
                }
                let _ = write!(out, "[{}]{}", token, superscript(popups.len()));
            }
        }
    }
    let _ = writeln!(out);

    if !popups.is_empty() {
        let _ = writeln!(out, "{RULE}");
    }
    for (index, popup) in popups.iter().enumerate() {
        match &popup.language {
            Some(language) => {
                let _ = writeln!(out, "{} {} ({})", index + 1, popup.heading, language);
            }
            None => {
                let _ = writeln!(out, "{} {}", index + 1, popup.heading);
            }
        }
        for line in popup.body.lines() {
            let _ = writeln!(out, "    {line}");
        }
    }

    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "Words used: {}", text.words_used.join(", "));
    out
}

fn superscript(n: usize) -> String {
    const DIGITS: [char; 10] = ['⁰', '¹', '²', '³', '⁴', '⁵', '⁶', '⁷', '⁸', '⁹'];
    n.to_string()
        .chars()
        .filter_map(|c| c.to_digit(10))
        .map(|d| DIGITS[d as usize])
        .collect()
}

/// One animation frame of the word bag as a character grid.
pub fn render_orb(particles: &[Particle], overflow: usize) -> String {
    let mut grid = vec![vec![' '; ORB_COLUMNS]; ORB_ROWS];
    let to_cell = |x: f64, y: f64| -> (usize, usize) {
        let col = (x / 100.0 * (ORB_COLUMNS - 1) as f64).round();
        let row = (y / 100.0 * (ORB_ROWS - 1) as f64).round();
        (
            col.clamp(0.0, (ORB_COLUMNS - 1) as f64) as usize,
            row.clamp(0.0, (ORB_ROWS - 1) as f64) as usize,
        )
    };

    // Outline of the boundary circle, slightly outside the particle radius.
    for step in 0..180 {
        let angle = step as f64 / 180.0 * std::f64::consts::TAU;
        let (col, row) = to_cell(
            CENTER + angle.cos() * (MAX_RADIUS + 4.0),
            CENTER + angle.sin() * (MAX_RADIUS + 4.0),
        );
        grid[row][col] = '·';
    }

    for particle in particles {
        let (col, row) = to_cell(particle.x, particle.y);
        let label: Vec<char> = particle.label.chars().collect();
        let start = col.saturating_sub(label.len() / 2);
        for (offset, ch) in label.iter().enumerate() {
            if let Some(cell) = grid[row].get_mut(start + offset) {
                *cell = *ch;
            }
        }
    }

    let mut out: String = grid
        .into_iter()
        .map(|row| row.into_iter().collect::<String>().trim_end().to_string())
        .collect::<Vec<_>>()
        .join("\n");
    out.push('\n');
    if overflow > 0 {
        let _ = writeln!(out, "+ {overflow} more below");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn word(surface: &str, translation: Option<&str>) -> Word {
        Word {
            id: Uuid::new_v4(),
            user_id: "ada@example.com".to_string(),
            word: surface.to_string(),
            language: "English".to_string(),
            translation: translation.map(str::to_string),
            example_sentence: None,
            created_at: Utc::now(),
        }
    }

    fn text(content: &str) -> GeneratedText {
        GeneratedText {
            id: Uuid::new_v4(),
            user_id: "ada@example.com".to_string(),
            title: "A Day Out".to_string(),
            content: content.to_string(),
            text_type: TextType::ShortStory,
            language: "English".to_string(),
            words_used: vec!["cat".to_string()],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn text_detail_shows_popup_for_known_word() {
        let words = vec![word("cat", Some("a small domesticated feline"))];
        let out = render_text_detail(&text("I saw a **cat** today"), &words);
        assert!(out.contains("I saw a [cat]¹ today"));
        assert!(out.contains("1 cat (English)"));
        assert!(out.contains("a small domesticated feline"));
    }

    #[test]
    fn text_detail_falls_back_for_unknown_word() {
        let out = render_text_detail(&text("I saw a **cat** today"), &[]);
        assert!(out.contains("[cat]¹"));
        assert!(out.contains("not in your bag"));
    }

    #[test]
    fn dashboard_previews_strip_markers() {
        let user = User::from_email("ada@example.com");
        let out = render_dashboard(&user, &[word("cat", None)], &[text("A **cat** sat.")]);
        assert!(out.contains("Welcome back, ada"));
        assert!(out.contains("Total Words: 1"));
        assert!(out.contains("A cat sat."));
        assert!(!out.contains("**"));
    }

    #[test]
    fn empty_states() {
        let user = User::from_email("ada@example.com");
        assert!(render_dashboard(&user, &[], &[]).contains("No words yet."));
        assert!(render_word_bag(&[]).contains("Your Bag is Empty"));
        assert!(render_my_texts(&[]).contains("No stories yet."));
    }

    #[test]
    fn logged_out_state_renders_landing() {
        let state = ShellState {
            view: AppView::Dashboard,
            ..ShellState::default()
        };
        assert!(render(&state).contains("Transform Your Vocabulary"));
    }

    #[test]
    fn orb_shows_labels_and_overflow() {
        let particle = Particle {
            word_id: Uuid::new_v4(),
            label: "gato".to_string(),
            x: 50.0,
            y: 50.0,
            vx: 0.0,
            vy: 0.0,
            scale: 1.0,
        };
        let out = render_orb(&[particle], 3);
        assert!(out.contains("gato"));
        assert!(out.contains("+ 3 more below"));
    }

    #[test]
    fn word_bag_summarises_overflow() {
        let words: Vec<Word> = (0..23).map(|i| word(&format!("w{i}"), None)).collect();
        let out = render_word_bag(&words);
        assert!(out.contains("Word Bag (23 words)"));
        assert!(out.contains("20 floating in the orb"));
        assert!(out.contains("+ 3 more below"));
        assert!(out.contains("w22"));

        let out = render_word_bag(&words[..5]);
        assert!(out.contains("5 floating in the orb"));
        assert!(!out.contains("more below"));
    }

    #[test]
    fn superscripts() {
        assert_eq!(superscript(12), "¹²");
    }
}
