use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use csv::{QuoteStyle, ReaderBuilder, Terminator, Trim, WriterBuilder};
use log::{debug, warn};

use crate::error::{WishlistError, WishlistResult};
use crate::model::card::{Card, CardPatch};

pub const HEADER: &str = "Name, Set, Year, Value";

/// Owns the wishlist file. Nothing else reads or writes it.
#[derive(Debug, Clone)]
pub struct RecordStore {
    path: PathBuf,
}

impl RecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        RecordStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the file with only the header row. Returns `false` when the
    /// file already existed and was left untouched.
    pub fn initialize(&self) -> WishlistResult<bool> {
        if self.path.exists() {
            return Ok(false);
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| WishlistError::io(parent, e))?;
        }

        fs::write(&self.path, format!("{HEADER}\n"))
            .map_err(|e| WishlistError::io(&self.path, e))?;

        debug!("created wishlist file {}", self.path.display());
        Ok(true)
    }

    pub fn append(&self, card: &Card) -> WishlistResult<()> {
        self.initialize()?;

        let file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|e| WishlistError::io(&self.path, e))?;

        let mut writer = row_writer(file);
        writer.write_record(card.fields())?;
        writer.flush().map_err(|e| WishlistError::io(&self.path, e))?;

        Ok(())
    }

    /// Records in file order, oldest first.
    pub fn load_all(&self) -> WishlistResult<Vec<Card>> {
        if !self.path.exists() {
            warn!("wishlist file {} is missing, treating as empty", self.path.display());
            return Ok(Vec::new());
        }

        let data = fs::read(&self.path).map_err(|e| WishlistError::io(&self.path, e))?;

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .quoting(false)
            .trim(Trim::All)
            .from_reader(data.as_slice());

        let mut cards = Vec::new();

        for row in reader.records() {
            let row = row?;

            if row.len() == 1 && row[0].is_empty() {
                continue;
            }

            if row.len() != 4 {
                return Err(WishlistError::MalformedRow {
                    line: row.position().map(|p| p.line()).unwrap_or(0),
                    found: row.len(),
                });
            }

            cards.push(Card::new(&row[0], &row[1], &row[2], &row[3]));
        }

        Ok(cards)
    }

    /// Removes the first record equal to `candidate` in all four fields.
    pub fn remove_matching(&self, candidate: &Card) -> WishlistResult<Option<Card>> {
        Ok(self
            .remove_matching_with(candidate, |_| Ok(()))?
            .map(|(card, ())| card))
    }

    /// Like `remove_matching`, but runs `describe` on the matched record
    /// before the file is rewritten. If it fails, the file is left as is.
    pub fn remove_matching_with<T, F>(
        &self,
        candidate: &Card,
        describe: F,
    ) -> WishlistResult<Option<(Card, T)>>
    where
        F: FnOnce(&Card) -> WishlistResult<T>,
    {
        let mut cards = self.load_all()?;

        let Some(idx) = cards.iter().position(|c| c == candidate) else {
            return Ok(None);
        };

        let description = describe(&cards[idx])?;
        let removed = cards.remove(idx);
        self.rewrite(&cards)?;

        Ok(Some((removed, description)))
    }

    /// Patches the first record named `old_name` in place and returns it.
    pub fn edit_matching(&self, old_name: &str, patch: &CardPatch) -> WishlistResult<Option<Card>> {
        let mut cards = self.load_all()?;

        let Some(card) = cards.iter_mut().find(|c| c.name == old_name) else {
            return Ok(None);
        };

        patch.apply(card);
        let edited = card.clone();
        self.rewrite(&cards)?;

        Ok(Some(edited))
    }

    fn rewrite(&self, cards: &[Card]) -> WishlistResult<()> {
        let bytes = render(cards).map_err(|e| WishlistError::io(&self.path, e))?;
        write_atomic(&self.path, &bytes)
    }
}

fn row_writer<W: Write>(inner: W) -> csv::Writer<W> {
    WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(inner)
}

fn render(cards: &[Card]) -> std::io::Result<Vec<u8>> {
    let mut out = format!("{HEADER}\n").into_bytes();

    {
        let mut writer = row_writer(&mut out);
        for card in cards {
            writer.write_record(card.fields())?;
        }
        writer.flush()?;
    }

    Ok(out)
}

fn write_atomic(path: &Path, bytes: &[u8]) -> WishlistResult<()> {
    let tmp = tmp_path(path);

    fs::write(&tmp, bytes).map_err(|e| WishlistError::io(&tmp, e))?;

    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(WishlistError::io(path, e));
    }

    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut p = path.to_path_buf();
    let file_name = match path.file_name().and_then(|s| s.to_str()) {
        Some(n) => n.to_string(),
        None => "wishlist".to_string(),
    };
    p.set_file_name(format!("{file_name}.tmp"));
    p
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, RecordStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("wishlist.csv"));
        store.initialize().unwrap();
        (dir, store)
    }

    fn charizard() -> Card {
        Card::new("Charizard", "Base Set", "1999", "200.0")
    }

    fn blastoise() -> Card {
        Card::new("Blastoise", "Base Set", "1999", "120")
    }

    fn venusaur() -> Card {
        Card::new("Venusaur", "Base Set", "1999", "90.5")
    }

    #[test]
    fn test_initialize_writes_header_once() {
        let (_dir, store) = store();
        store.append(&charizard()).unwrap();

        assert!(!store.initialize().unwrap());
        assert!(!store.initialize().unwrap());

        let text = fs::read_to_string(store.path()).unwrap();
        assert_eq!(text, "Name, Set, Year, Value\nCharizard,Base Set,1999,200.0\n");
    }

    #[test]
    fn test_initialize_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("data").join("wishlist.csv"));
        assert!(store.initialize().unwrap());
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_header_only_loads_empty() {
        let (_dir, store) = store();
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("absent.csv"));
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_append_then_load_returns_record_last() {
        let (_dir, store) = store();
        store.append(&blastoise()).unwrap();
        store.append(&charizard()).unwrap();

        let cards = store.load_all().unwrap();
        assert_eq!(cards, vec![blastoise(), charizard()]);
    }

    #[test]
    fn test_quotes_round_trip_unescaped() {
        let (_dir, store) = store();
        let card = Card::new("Pikachu \"Birthday\"", "Black Star", "1999", "30");
        store.append(&card).unwrap();
        store.append(&charizard()).unwrap();
        store.remove_matching(&charizard()).unwrap();

        assert_eq!(store.load_all().unwrap(), vec![card]);
        let text = fs::read_to_string(store.path()).unwrap();
        assert!(text.ends_with("Pikachu \"Birthday\",Black Star,1999,30\n"));
    }

    #[test]
    fn test_load_trims_fields_and_skips_blank_lines() {
        let (_dir, store) = store();
        fs::write(
            store.path(),
            "Name, Set, Year, Value\n Charizard , Base Set, 1999 , 200.0\n\nBlastoise,Base Set,1999,120\n",
        )
        .unwrap();

        assert_eq!(store.load_all().unwrap(), vec![charizard(), blastoise()]);
    }

    #[test]
    fn test_load_rejects_short_row() {
        let (_dir, store) = store();
        fs::write(store.path(), "Name, Set, Year, Value\nCharizard,Base Set\n").unwrap();

        let err = store.load_all().unwrap_err();
        assert!(matches!(err, WishlistError::MalformedRow { found: 2, .. }));
    }

    #[test]
    fn test_remove_keeps_order_of_others() {
        let (_dir, store) = store();
        for card in [charizard(), blastoise(), venusaur()] {
            store.append(&card).unwrap();
        }

        let removed = store.remove_matching(&blastoise()).unwrap();
        assert_eq!(removed, Some(blastoise()));
        assert_eq!(store.load_all().unwrap(), vec![charizard(), venusaur()]);

        let text = fs::read_to_string(store.path()).unwrap();
        assert!(text.starts_with("Name, Set, Year, Value\n"));
    }

    #[test]
    fn test_remove_only_first_duplicate() {
        let (_dir, store) = store();
        store.append(&charizard()).unwrap();
        store.append(&blastoise()).unwrap();
        store.append(&charizard()).unwrap();

        store.remove_matching(&charizard()).unwrap();
        assert_eq!(store.load_all().unwrap(), vec![blastoise(), charizard()]);
    }

    #[test]
    fn test_remove_with_failing_describe_keeps_record() {
        let (_dir, store) = store();
        let pikachu = Card::new("Pikachu", "Jungle", "1999", "cheap");
        store.append(&pikachu).unwrap();

        let result = store.remove_matching_with(&pikachu, |c| c.amount());
        assert!(matches!(result, Err(WishlistError::InvalidValue { .. })));
        assert_eq!(store.load_all().unwrap(), vec![pikachu]);
    }

    #[test]
    fn test_remove_miss_leaves_store_unchanged() {
        let (_dir, store) = store();
        store.append(&charizard()).unwrap();
        let before = fs::read_to_string(store.path()).unwrap();

        // "200" is a different record from "200.0"
        let candidate = Card::new("Charizard", "Base Set", "1999", "200");
        assert_eq!(store.remove_matching(&candidate).unwrap(), None);
        assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
    }

    #[test]
    fn test_edit_updates_only_supplied_fields() {
        let (_dir, store) = store();
        store.append(&charizard()).unwrap();
        store.append(&blastoise()).unwrap();

        let patch = CardPatch {
            set_name: "NewSet".to_string(),
            ..CardPatch::default()
        };
        let edited = store.edit_matching("Charizard", &patch).unwrap();

        let expected = Card::new("Charizard", "NewSet", "1999", "200.0");
        assert_eq!(edited, Some(expected.clone()));
        assert_eq!(store.load_all().unwrap(), vec![expected, blastoise()]);
    }

    #[test]
    fn test_edit_can_rename() {
        let (_dir, store) = store();
        store.append(&charizard()).unwrap();

        let patch = CardPatch {
            name: "Dark Charizard".to_string(),
            set_name: "Team Rocket".to_string(),
            year: "2000".to_string(),
            value: "80".to_string(),
        };
        store.edit_matching("Charizard", &patch).unwrap();

        assert_eq!(
            store.load_all().unwrap(),
            vec![Card::new("Dark Charizard", "Team Rocket", "2000", "80")]
        );
    }

    #[test]
    fn test_edit_miss_leaves_store_unchanged() {
        let (_dir, store) = store();
        store.append(&charizard()).unwrap();
        let before = fs::read_to_string(store.path()).unwrap();

        let patch = CardPatch {
            value: "1".to_string(),
            ..CardPatch::default()
        };
        assert_eq!(store.edit_matching("Mewtwo", &patch).unwrap(), None);
        assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
    }

    #[test]
    fn test_rewrite_leaves_no_temp_file() {
        let (dir, store) = store();
        store.append(&charizard()).unwrap();
        store.remove_matching(&charizard()).unwrap();

        assert!(!dir.path().join("wishlist.csv.tmp").exists());
    }
}
