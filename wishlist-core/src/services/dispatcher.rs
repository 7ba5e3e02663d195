use log::info;

use crate::error::WishlistResult;
use crate::protocol::{Request, Response};
use crate::services::{listing, store::RecordStore};

pub const ADDED: &str = "Card added to wishlist successfully!";
pub const NOT_FOUND: &str = "The card you are trying to delete is not in the wishlist";
pub const EDITED: &str = "Edited card in wishlist!";
pub const NOT_EDITED: &str = "Unable to edit the specified card!";

/// Routes decoded requests to the record store and builds replies.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    store: RecordStore,
}

impl Dispatcher {
    pub fn new(store: RecordStore) -> Self {
        Dispatcher { store }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn handle(&self, request: &Request) -> WishlistResult<Response> {
        match request {
            Request::Display => {
                let cards = self.store.load_all()?;
                let message = listing::wishlist(&cards)?;
                info!("sending wishlist with {} cards", cards.len());
                Ok(Response::with_cards(message, cards))
            }

            Request::Add(card) => {
                self.store.append(card)?;
                info!("added {} to wishlist", card.name);
                Ok(Response::message(ADDED))
            }

            Request::Remove(candidate) => {
                match self.store.remove_matching_with(candidate, listing::removed)? {
                    Some((removed, message)) => {
                        info!("removed {} from wishlist", removed.name);
                        Ok(Response::message(message))
                    }
                    None => {
                        info!("no wishlist card matched {}", candidate.name);
                        Ok(Response::message(NOT_FOUND))
                    }
                }
            }

            Request::Edit(fields) => {
                match self.store.edit_matching(&fields.old_name, &fields.patch())? {
                    Some(edited) => {
                        info!("edited {} (now {})", fields.old_name, edited.name);
                        Ok(Response::message(EDITED))
                    }
                    None => {
                        info!("no wishlist card named {}", fields.old_name);
                        Ok(Response::message(NOT_EDITED))
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::card::Card;
    use crate::protocol::EditFields;
    use tempfile::TempDir;

    fn dispatcher() -> (TempDir, Dispatcher) {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("wishlist.csv"));
        store.initialize().unwrap();
        (dir, Dispatcher::new(store))
    }

    fn edit(old_name: &str, value: &str) -> Request {
        Request::Edit(EditFields {
            old_name: old_name.to_string(),
            name: String::new(),
            set_name: String::new(),
            year: String::new(),
            value: value.to_string(),
        })
    }

    #[test]
    fn test_display_empty() {
        let (_dir, d) = dispatcher();
        let resp = d.handle(&Request::Display).unwrap();
        assert_eq!(resp.message, "You don't have anything in your wishlist yet!");
        assert_eq!(resp.cards, Some(Vec::new()));
    }

    #[test]
    fn test_add_then_display() {
        let (_dir, d) = dispatcher();
        let card = Card::new("Charizard", "Base Set", "1999", "200.0");

        let resp = d.handle(&Request::Add(card.clone())).unwrap();
        assert_eq!(resp, Response::message(ADDED));

        let resp = d.handle(&Request::Display).unwrap();
        assert!(resp.message.contains("1. Charizard - 1999 Base Set - $200.00"));
        assert_eq!(resp.cards, Some(vec![card]));
    }

    #[test]
    fn test_remove_reports_card() {
        let (_dir, d) = dispatcher();
        let card = Card::new("Charizard", "Base Set", "1999", "200.0");
        d.handle(&Request::Add(card.clone())).unwrap();

        let resp = d.handle(&Request::Remove(card)).unwrap();
        assert_eq!(
            resp.message,
            "The following card has been removed from wishlist:\nCharizard - 1999 Base Set - $200.00\n"
        );
        assert_eq!(resp.cards, None);
    }

    #[test]
    fn test_remove_miss() {
        let (_dir, d) = dispatcher();
        let resp = d
            .handle(&Request::Remove(Card::new("Mew", "Promo", "2000", "1")))
            .unwrap();
        assert_eq!(resp.message, NOT_FOUND);
    }

    #[test]
    fn test_edit_hit_and_miss() {
        let (_dir, d) = dispatcher();
        d.handle(&Request::Add(Card::new("Charizard", "Base Set", "1999", "200.0")))
            .unwrap();

        assert_eq!(d.handle(&edit("Charizard", "150")).unwrap().message, EDITED);
        assert_eq!(d.handle(&edit("Mewtwo", "150")).unwrap().message, NOT_EDITED);
        assert_eq!(
            d.store().load_all().unwrap(),
            vec![Card::new("Charizard", "Base Set", "1999", "150")]
        );
    }

    #[test]
    fn test_remove_with_bad_value_reports_error_and_keeps_card() {
        let (_dir, d) = dispatcher();
        let pikachu = Card::new("Pikachu", "Jungle", "1999", "cheap");
        d.handle(&Request::Add(pikachu.clone())).unwrap();

        let err = d.handle(&Request::Remove(pikachu.clone())).unwrap_err();
        assert!(err.to_string().contains("cheap"));
        assert_eq!(d.store().load_all().unwrap(), vec![pikachu]);
    }

    #[test]
    fn test_display_with_bad_value_is_error() {
        let (_dir, d) = dispatcher();
        d.handle(&Request::Add(Card::new("Pikachu", "Jungle", "1999", "cheap")))
            .unwrap();

        let err = d.handle(&Request::Display).unwrap_err();
        assert!(err.to_string().contains("cheap"));
    }
}
