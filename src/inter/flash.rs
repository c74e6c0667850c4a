/*!
One-shot messages carried in the session from one request to the page that
gets rendered next.
*/
use serde::{Deserialize, Serialize};
use tower_sessions::{session, Session};

const FLASH_KEY: &str = "_flashes";

/// Also used as the CSS class of the rendered message.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Success,
    Danger,
    Info,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Flash {
    pub category: Category,
    pub message: String,
}

/// Queue a message for the next rendered page.
pub async fn flash(
    session: &Session,
    category: Category,
    message: &str,
) -> Result<(), session::Error> {
    log::trace!("flash( {:?}, {:?} ) called.", &category, message);

    let mut flashes: Vec<Flash> = session.get(FLASH_KEY).await?.unwrap_or_default();
    flashes.push(Flash { category, message: message.to_owned() });
    session.insert(FLASH_KEY, flashes).await
}

/// Remove and return every queued message, oldest first.
pub async fn take_flashes(session: &Session) -> Result<Vec<Flash>, session::Error> {
    let flashes: Option<Vec<Flash>> = session.remove(FLASH_KEY).await?;
    Ok(flashes.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    #[tokio::test]
    async fn flashes_come_out_once_in_order() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);

        flash(&session, Category::Success, "primero").await.unwrap();
        flash(&session, Category::Danger, "segundo").await.unwrap();

        let flashes = take_flashes(&session).await.unwrap();
        assert_eq!(
            flashes,
            vec![
                Flash { category: Category::Success, message: "primero".to_owned() },
                Flash { category: Category::Danger, message: "segundo".to_owned() },
            ]
        );
        assert!(take_flashes(&session).await.unwrap().is_empty());
    }

    #[test]
    fn categories_serialize_as_css_classes() {
        let v = serde_json::to_value(Category::Danger).unwrap();
        assert_eq!(v, serde_json::json!("danger"));
    }
}
