use std::{future::Future, time::Duration};

use {
    async_trait::async_trait,
    relay_channels::{Error as ChannelError, MediaKind, RelayOutbound, Result},
    teloxide::{
        RequestError,
        payloads::{
            SendAudioSetters, SendDocumentSetters, SendMessageSetters, SendPhotoSetters,
            SendVideoSetters, SendVoiceSetters,
        },
        prelude::*,
        types::{ChatId, InputFile, MessageId, ReplyParameters},
    },
    tracing::{debug, warn},
};

const TELEGRAM_RETRY_AFTER_MAX_RETRIES: usize = 4;

/// Sends relayed copies and command replies through the Bot API.
///
/// `RetryAfter` responses are waited out up to
/// `TELEGRAM_RETRY_AFTER_MAX_RETRIES` times; every other failure surfaces as
/// [`ChannelError::TransportFailure`].
#[derive(Clone)]
pub struct TelegramOutbound {
    bot: Bot,
}

impl TelegramOutbound {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    /// Answer a command in `to`, quoting the command message.
    pub async fn reply(&self, to: i64, reply_to: MessageId, text: &str) -> Result<()> {
        let params = ReplyParameters::new(reply_to).allow_sending_without_reply();
        self.run_with_retry(to, "send_message", || {
            self.bot
                .send_message(ChatId(to), text)
                .reply_parameters(params.clone())
                .into_future()
        })
        .await
        .map(drop)
        .map_err(|e| ChannelError::transport("reply", e))
    }

    async fn run_with_retry<T, F, Fut>(
        &self,
        to: i64,
        operation: &'static str,
        mut request: F,
    ) -> std::result::Result<T, RequestError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, RequestError>>,
    {
        let mut retries = 0usize;

        loop {
            match request().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    let Some(wait) = retry_after_duration(&err) else {
                        return Err(err);
                    };

                    if retries >= TELEGRAM_RETRY_AFTER_MAX_RETRIES {
                        warn!(
                            chat_id = to,
                            operation,
                            retries,
                            retry_after_secs = wait.as_secs(),
                            "telegram rate limit persisted after retries"
                        );
                        return Err(err);
                    }

                    retries += 1;
                    warn!(
                        chat_id = to,
                        operation,
                        retries,
                        max_retries = TELEGRAM_RETRY_AFTER_MAX_RETRIES,
                        retry_after_secs = wait.as_secs(),
                        "telegram rate limited, waiting before retry"
                    );
                    tokio::time::sleep(wait).await;
                },
            }
        }
    }
}

fn retry_after_duration(error: &RequestError) -> Option<Duration> {
    match error {
        RequestError::RetryAfter(wait) => Some(wait.duration()),
        _ => None,
    }
}

#[async_trait]
impl RelayOutbound for TelegramOutbound {
    async fn send_text(&self, to: i64, text: &str) -> Result<()> {
        self.run_with_retry(to, "send_message", || {
            self.bot.send_message(ChatId(to), text).into_future()
        })
        .await
        .map_err(|e| ChannelError::transport("send_message", e))?;
        debug!(chat_id = to, text_len = text.len(), "telegram outbound text sent");
        Ok(())
    }

    async fn send_media(
        &self,
        to: i64,
        media: MediaKind,
        file_id: &str,
        caption: Option<&str>,
    ) -> Result<()> {
        let chat = ChatId(to);
        let file = || InputFile::file_id(file_id.to_string());
        let operation = match media {
            MediaKind::Photo => "send_photo",
            MediaKind::Document => "send_document",
            MediaKind::Voice => "send_voice",
            MediaKind::Audio => "send_audio",
            MediaKind::Video => "send_video",
        };

        let sent = match media {
            MediaKind::Photo => {
                self.run_with_retry(to, operation, || {
                    let mut req = self.bot.send_photo(chat, file());
                    if let Some(c) = caption {
                        req = req.caption(c);
                    }
                    req.into_future()
                })
                .await
            },
            MediaKind::Document => {
                self.run_with_retry(to, operation, || {
                    let mut req = self.bot.send_document(chat, file());
                    if let Some(c) = caption {
                        req = req.caption(c);
                    }
                    req.into_future()
                })
                .await
            },
            MediaKind::Voice => {
                self.run_with_retry(to, operation, || {
                    let mut req = self.bot.send_voice(chat, file());
                    if let Some(c) = caption {
                        req = req.caption(c);
                    }
                    req.into_future()
                })
                .await
            },
            MediaKind::Audio => {
                self.run_with_retry(to, operation, || {
                    let mut req = self.bot.send_audio(chat, file());
                    if let Some(c) = caption {
                        req = req.caption(c);
                    }
                    req.into_future()
                })
                .await
            },
            MediaKind::Video => {
                self.run_with_retry(to, operation, || {
                    let mut req = self.bot.send_video(chat, file());
                    if let Some(c) = caption {
                        req = req.caption(c);
                    }
                    req.into_future()
                })
                .await
            },
        };

        sent.map_err(|e| ChannelError::transport(operation, e))?;
        debug!(
            chat_id = to,
            media = media.as_str(),
            has_caption = caption.is_some(),
            "telegram outbound media sent"
        );
        Ok(())
    }
}
