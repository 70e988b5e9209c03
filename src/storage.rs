use chrono::{DateTime, Local};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

/// Writes poems into a single directory and reads them back by filename.
#[derive(Debug, Clone)]
pub struct PoemStore {
    dir: PathBuf
}

impl PoemStore {

    pub fn new(dir: impl Into<PathBuf>) -> Self {

        PoemStore { dir: dir.into() }

    }

    pub fn dir(&self) -> &Path {

        &self.dir

    }

    pub async fn save(&self, theme: &str, lines: &[String], provider: &str) -> io::Result<String> {

        self.save_at(Local::now(), theme, lines, provider).await

    }

    /// Saves using `now` for both the filename and the "Generated on" footer.
    /// Same theme within the same second overwrites the earlier file.
    pub async fn save_at(
        &self,
        now: DateTime<Local>,
        theme: &str,
        lines: &[String],
        provider: &str
    ) -> io::Result<String> {

        let filename = format!(
            "poem_{}_{}.txt",
            filename_safe(theme),
            now.format("%Y%m%d_%H%M%S")
        );

        fs::create_dir_all(&self.dir).await?;
        fs::write(self.dir.join(&filename), render_poem(theme, lines, provider, now)).await?;

        info!(filename = %filename, lines = lines.len(), "poem saved");
        Ok(filename)

    }

    /// Reads a saved poem. Names that aren't plain files of this directory are
    /// reported as not found.
    pub async fn read(&self, filename: &str) -> io::Result<Vec<u8>> {

        let path = self.resolve(filename)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "invalid filename"))?;
        fs::read(path).await

    }

    fn resolve(&self, filename: &str) -> Option<PathBuf> {

        is_valid_filename(filename).then(|| self.dir.join(filename))

    }

}

pub fn render_poem(theme: &str, lines: &[String], provider: &str, now: DateTime<Local>) -> String {

    format!(
        "AI Generated Poem ({})\nPowered by {}\n\n{}\n\nGenerated on: {}\nTotal lines: {}",
        capitalize(theme),
        provider,
        lines.join("\n"),
        now.format("%Y-%m-%d %H:%M:%S"),
        lines.len()
    )

}

// first character upper, the rest lower
fn capitalize(word: &str) -> String {

    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new()
    }

}

fn filename_safe(theme: &str) -> String {

    theme
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()

}

fn is_valid_filename(filename: &str) -> bool {

    !filename.is_empty()
        && !filename.starts_with('.')
        && !filename.contains("..")
        && filename.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))

}
