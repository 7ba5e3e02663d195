use crate::error::WishlistResult;
use crate::model::card::Card;

pub const EMPTY_WISHLIST: &str = "You don't have anything in your wishlist yet!";

/// `<name> - <year> <set_name> - $<value>` with the value at two decimals.
pub fn card_line(card: &Card) -> WishlistResult<String> {
    let amount = card.amount()?;
    Ok(format!(
        "{} - {} {} - ${:.2}",
        card.name, card.year, card.set_name, amount
    ))
}

pub fn wishlist(cards: &[Card]) -> WishlistResult<String> {
    if cards.is_empty() {
        return Ok(EMPTY_WISHLIST.to_string());
    }

    let mut out = String::from("Here is your current wishlist:\n\n");
    for (i, card) in cards.iter().enumerate() {
        out.push_str(&format!("{}. {}\n\n", i + 1, card_line(card)?));
    }

    Ok(out)
}

pub fn removed(card: &Card) -> WishlistResult<String> {
    Ok(format!(
        "The following card has been removed from wishlist:\n{}\n",
        card_line(card)?
    ))
}
