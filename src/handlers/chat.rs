use std::future::Future;
use std::path::Path;

use anyhow::Result;
use teloxide::prelude::*;
use teloxide::types::InputFile;

/// The two chat primitives the command interpreter needs.
pub trait ChatTransport: Send + Sync {
    fn send_text(&self, chat_id: ChatId, text: &str) -> impl Future<Output = Result<()>> + Send;

    fn send_image_file(
        &self,
        chat_id: ChatId,
        path: &Path,
        caption: &str,
    ) -> impl Future<Output = Result<()>> + Send;
}

impl ChatTransport for Bot {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<()> {
        self.send_message(chat_id, text.to_string()).await?;
        Ok(())
    }

    async fn send_image_file(&self, chat_id: ChatId, path: &Path, caption: &str) -> Result<()> {
        self.send_photo(chat_id, InputFile::file(path.to_path_buf()))
            .caption(caption.to_string())
            .await?;
        Ok(())
    }
}
