use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{WishlistError, WishlistResult};
use crate::model::card::{trimmed_text, Card, CardPatch};
use crate::services::dispatcher::Dispatcher;

mod command;
pub use command::Command;

/// One client request, tagged by its `command` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum Request {
    Display,
    Add(Card),
    Remove(Card),
    Edit(EditFields),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditFields {
    #[serde(deserialize_with = "trimmed_text")]
    pub old_name: String,

    #[serde(deserialize_with = "trimmed_text")]
    pub name: String,

    #[serde(deserialize_with = "trimmed_text")]
    pub set_name: String,

    #[serde(deserialize_with = "trimmed_text")]
    pub year: String,

    #[serde(deserialize_with = "trimmed_text")]
    pub value: String,
}

impl EditFields {
    pub fn patch(&self) -> CardPatch {
        CardPatch {
            name: self.name.clone(),
            set_name: self.set_name.clone(),
            year: self.year.clone(),
            value: self.value.clone(),
        }
    }
}

impl Request {
    pub fn command(&self) -> Command {
        match self {
            Request::Display => Command::Display,
            Request::Add(_) => Command::Add,
            Request::Remove(_) => Command::Remove,
            Request::Edit(_) => Command::Edit,
        }
    }

    fn validate(&self) -> WishlistResult<()> {
        match self {
            Request::Display => Ok(()),
            Request::Add(card) | Request::Remove(card) => card.validate(),
            Request::Edit(fields) => {
                if fields.old_name.is_empty() {
                    return Err(WishlistError::InvalidField {
                        field: "old_name",
                        reason: "must not be empty".to_string(),
                    });
                }
                fields.patch().validate()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cards: Option<Vec<Card>>,
}

impl Response {
    pub fn message(message: impl Into<String>) -> Self {
        Response {
            message: message.into(),
            cards: None,
        }
    }

    pub fn with_cards(message: impl Into<String>, cards: Vec<Card>) -> Self {
        Response {
            message: message.into(),
            cards: Some(cards),
        }
    }

    pub fn error(err: &WishlistError) -> Self {
        Response::message(format!("Error: {err}"))
    }
}

pub fn decode(input: &str) -> WishlistResult<Request> {
    let req: Value =
        serde_json::from_str(input).map_err(|e| WishlistError::InvalidJson(e.to_string()))?;

    let cmd_str = req
        .get("command")
        .and_then(|v| v.as_str())
        .ok_or(WishlistError::MissingCommand)?;

    if Command::from(cmd_str) == Command::Unknown {
        return Err(WishlistError::UnknownCommand(cmd_str.to_string()));
    }

    let command = cmd_str.to_string();
    let request: Request =
        serde_json::from_value(req).map_err(|e| WishlistError::InvalidRequest {
            command,
            message: e.to_string(),
        })?;

    request.validate()?;
    Ok(request)
}

pub fn encode(response: &Response) -> String {
    serde_json::to_string(response).unwrap_or_else(|e| {
        json!({ "message": format!("Error: failed to encode response: {e}") }).to_string()
    })
}

/// Decodes one request line, dispatches it, and returns the reply line.
pub fn handle(dispatcher: &Dispatcher, input: &str) -> String {
    let response = match decode(input) {
        Ok(request) => {
            info!("received {} request", request.command());
            dispatcher.handle(&request).unwrap_or_else(|e| {
                warn!("{} request failed: {e}", request.command());
                Response::error(&e)
            })
        }
        Err(e) => {
            warn!("rejected request: {e}");
            Response::error(&e)
        }
    };

    encode(&response)
}
