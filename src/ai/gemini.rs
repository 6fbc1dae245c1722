use super::{
    ChatTier, GenerationError, GenerationResult, GenerativeBackend, InlineImage, TextStream,
    VideoOperation, VideoRequest,
};
use crate::config::Settings;
use crate::types::{ChatMessage, ImageInput, Role};
use async_trait::async_trait;
use futures::{Stream, StreamExt};
use futures::channel::mpsc::{self, UnboundedSender};
use reqwest::{Client, RequestBuilder, Response};
use rig::client::CompletionClient;
use rig::completion::Chat;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

const API_KEY_HEADER: &str = "x-goog-api-key";
const VIDEO_RESOLUTION: &str = "720p";
const IMAGE_MIME_TYPE: &str = "image/jpeg";

/// Gemini REST API client covering Imagen, Gemini and Veo models.
pub struct GeminiBackend {
    client: Client,
    settings: Settings,
    api_key: RwLock<Option<String>>,
}

impl GeminiBackend {
    pub fn new(settings: Settings) -> Self {
        let api_key = RwLock::new(settings.api_key.clone());
        Self {
            client: Client::new(),
            settings,
            api_key,
        }
    }

    fn api_key(&self) -> GenerationResult<String> {
        self.api_key
            .read()
            .map_err(|_| GenerationError::Transport("credential lock poisoned".into()))?
            .clone()
            .ok_or(GenerationError::MissingApiKey)
    }

    fn model_url(&self, model: &str, method: &str) -> String {
        format!(
            "{}/v1beta/models/{}:{}",
            self.settings.api_base.trim_end_matches('/'),
            model,
            method
        )
    }

    fn chat_model(&self, tier: ChatTier) -> &str {
        match tier {
            ChatTier::Complex => &self.settings.pro_chat_model,
            ChatTier::Fast => &self.settings.fast_chat_model,
        }
    }

    fn post(&self, url: &str) -> GenerationResult<RequestBuilder> {
        Ok(self.client.post(url).header(API_KEY_HEADER, self.api_key()?))
    }

    fn get(&self, url: &str) -> GenerationResult<RequestBuilder> {
        Ok(self.client.get(url).header(API_KEY_HEADER, self.api_key()?))
    }
}

// -----------------
// Wire types
// -----------------

#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn text(role: Option<&str>, text: &str) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![Part {
                text: Some(text.to_string()),
                inline_data: None,
            }],
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<&'static str>,
}

#[derive(Deserialize, Default)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    error: Option<ApiErrorBody>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Deserialize, Debug, Default)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
}

#[derive(Serialize)]
struct PredictRequest<I, P> {
    instances: Vec<I>,
    parameters: P,
}

#[derive(Serialize)]
struct ImagenInstance<'a> {
    prompt: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImagenParameters {
    sample_count: u32,
    output_mime_type: &'static str,
    aspect_ratio: &'static str,
}

#[derive(Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    #[serde(default)]
    bytes_base64_encoded: Option<String>,
    #[serde(default)]
    mime_type: Option<String>,
}

#[derive(Serialize)]
struct VeoInstance<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    prompt: Option<&'a str>,
    image: VeoImage,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VeoImage {
    bytes_base64_encoded: String,
    mime_type: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VeoParameters {
    aspect_ratio: &'static str,
    resolution: &'static str,
}

#[derive(Deserialize, Default)]
struct OperationResponse {
    #[serde(default)]
    name: String,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    response: Option<VideoResponseBody>,
    #[serde(default)]
    error: Option<ApiErrorBody>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoResponseBody {
    #[serde(default)]
    generate_video_response: Option<GeneratedVideos>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeneratedVideos {
    #[serde(default)]
    generated_samples: Vec<GeneratedSample>,
}

#[derive(Deserialize)]
struct GeneratedSample {
    #[serde(default)]
    video: Option<VideoRef>,
}

#[derive(Deserialize)]
struct VideoRef {
    #[serde(default)]
    uri: Option<String>,
}

// -----------------
// Parsing helpers (exported for tests)
// -----------------

/// One decoded SSE `data:` payload of a streamed reply.
#[derive(Debug, PartialEq, Eq)]
pub enum StreamFrame {
    Text(String),
    Error(String),
}

pub fn parse_gemini_sse_data(data: &str) -> Option<StreamFrame> {
    let trimmed = data.trim();
    if trimmed.is_empty() {
        return None;
    }
    let parsed = serde_json::from_str::<GenerateContentResponse>(trimmed).ok()?;
    if let Some(err) = parsed.error {
        return Some(StreamFrame::Error(err.message));
    }
    let text = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default();
    Some(StreamFrame::Text(text))
}

/// First inline image of the first candidate, if any.
pub fn first_inline_image(body: &str) -> GenerationResult<Option<InlineImage>> {
    let parsed: GenerateContentResponse = serde_json::from_str(body)?;
    Ok(parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().next())
        .and_then(|part| part.inline_data)
        .map(|inline| InlineImage {
            mime_type: inline.mime_type,
            data: inline.data,
        }))
}

pub fn parse_operation(body: &str) -> GenerationResult<VideoOperation> {
    let parsed: OperationResponse = serde_json::from_str(body)?;
    let video_uri = parsed
        .response
        .and_then(|response| response.generate_video_response)
        .and_then(|videos| videos.generated_samples.into_iter().next())
        .and_then(|sample| sample.video)
        .and_then(|video| video.uri);
    Ok(VideoOperation {
        name: parsed.name,
        done: parsed.done,
        video_uri,
        error: parsed.error.map(|err| err.message),
    })
}

fn history_contents(history: &[ChatMessage], text: &str) -> Vec<Content> {
    let mut contents: Vec<Content> = history
        .iter()
        .map(|msg| {
            let role = match msg.role {
                Role::User => "user",
                Role::Model => "model",
            };
            Content::text(Some(role), &msg.text)
        })
        .collect();
    contents.push(Content::text(Some("user"), text));
    contents
}

fn to_rig_messages(history: &[ChatMessage]) -> Vec<rig::message::Message> {
    history
        .iter()
        .map(|msg| match msg.role {
            Role::User => rig::message::Message::user(&msg.text),
            Role::Model => rig::message::Message::assistant(&msg.text),
        })
        .collect()
}

async fn ensure_success(response: Response) -> GenerationResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
        .map(|envelope| envelope.error.message)
        .unwrap_or(body);
    Err(GenerationError::Upstream {
        status: status.as_u16(),
        message,
    })
}

async fn read_json<T: DeserializeOwned>(response: Response) -> GenerationResult<T> {
    let body = ensure_success(response).await?.text().await?;
    Ok(serde_json::from_str(&body)?)
}

/// Reads SSE events off a body stream and forwards each text piece.
///
/// Lines are split on raw bytes and decoded only once complete, so a
/// multi-byte character split across two chunks survives intact.
async fn pump_sse<S, B, E>(
    stream: S,
    tx: &UnboundedSender<GenerationResult<String>>,
) -> GenerationResult<()>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    GenerationError: From<E>,
{
    let forward = |data: &str| -> GenerationResult<bool> {
        match parse_gemini_sse_data(data) {
            Some(StreamFrame::Text(piece)) if !piece.is_empty() => {
                Ok(tx.unbounded_send(Ok(piece)).is_ok())
            }
            Some(StreamFrame::Error(message)) => Err(GenerationError::Transport(message)),
            _ => Ok(true),
        }
    };

    let mut stream = std::pin::pin!(stream);
    let mut buffer: Vec<u8> = Vec::new();
    let mut data_acc: Option<String> = None;
    while let Some(item) = stream.next().await {
        buffer.extend_from_slice(item?.as_ref());
        while let Some(pos) = buffer.iter().position(|byte| *byte == b'\n') {
            let mut raw: Vec<u8> = buffer.drain(..=pos).collect();
            raw.pop();
            if raw.last() == Some(&b'\r') {
                raw.pop();
            }
            let line = String::from_utf8(raw).map_err(|err| {
                GenerationError::Transport(format!("invalid UTF-8 in stream: {err}"))
            })?;

            if line.is_empty() {
                if let Some(data) = data_acc.take()
                    && !forward(&data)?
                {
                    return Ok(());
                }
                continue;
            }

            if let Some(rest) = line.strip_prefix("data:") {
                let fragment = rest.trim_start();
                match &mut data_acc {
                    Some(existing) => existing.push_str(fragment),
                    None => data_acc = Some(fragment.to_string()),
                }
            }
        }
    }

    let tail = String::from_utf8_lossy(&buffer);
    if let Some(rest) = tail.trim_end_matches('\r').strip_prefix("data:") {
        let fragment = rest.trim_start();
        match &mut data_acc {
            Some(existing) => existing.push_str(fragment),
            None => data_acc = Some(fragment.to_string()),
        }
    }
    if let Some(data) = data_acc.take() {
        forward(&data)?;
    }
    Ok(())
}

#[async_trait]
impl GenerativeBackend for GeminiBackend {
    async fn generate_images(&self, prompt: &str) -> GenerationResult<Vec<InlineImage>> {
        let url = self.model_url(&self.settings.image_model, "predict");
        let response = self
            .post(&url)?
            .json(&PredictRequest {
                instances: vec![ImagenInstance { prompt }],
                parameters: ImagenParameters {
                    sample_count: 1,
                    output_mime_type: IMAGE_MIME_TYPE,
                    aspect_ratio: "1:1",
                },
            })
            .send()
            .await?;
        let parsed: PredictResponse = read_json(response).await?;
        Ok(parsed
            .predictions
            .into_iter()
            .filter_map(|prediction| {
                Some(InlineImage {
                    data: prediction.bytes_base64_encoded?,
                    mime_type: prediction
                        .mime_type
                        .unwrap_or_else(|| IMAGE_MIME_TYPE.to_string()),
                })
            })
            .collect())
    }

    async fn edit_image(
        &self,
        image: &ImageInput,
        instruction: &str,
    ) -> GenerationResult<Option<InlineImage>> {
        let url = self.model_url(&self.settings.edit_model, "generateContent");
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".into()),
                parts: vec![
                    Part {
                        text: None,
                        inline_data: Some(InlineData {
                            mime_type: image.mime_type.clone(),
                            data: image.base64(),
                        }),
                    },
                    Part {
                        text: Some(instruction.to_string()),
                        inline_data: None,
                    },
                ],
            }],
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                response_modalities: vec!["IMAGE"],
            }),
        };
        let response = self.post(&url)?.json(&request).send().await?;
        let body = ensure_success(response).await?.text().await?;
        first_inline_image(&body)
    }

    async fn chat(
        &self,
        tier: ChatTier,
        history: &[ChatMessage],
        text: &str,
    ) -> GenerationResult<String> {
        let client = rig::providers::gemini::Client::new(&self.api_key()?);
        let agent = client
            .agent(self.chat_model(tier))
            .preamble(tier.system_instruction())
            .build();

        agent
            .chat(text, to_rig_messages(history))
            .await
            .map_err(|err| GenerationError::Transport(err.to_string()))
    }

    async fn chat_stream(
        &self,
        tier: ChatTier,
        history: &[ChatMessage],
        text: &str,
    ) -> GenerationResult<TextStream> {
        let url = format!(
            "{}?alt=sse",
            self.model_url(self.chat_model(tier), "streamGenerateContent")
        );
        let request = GenerateContentRequest {
            contents: history_contents(history, text),
            system_instruction: Some(Content::text(None, tier.system_instruction())),
            generation_config: None,
        };
        let response = self
            .post(&url)?
            .header("accept", "text/event-stream")
            .json(&request)
            .send()
            .await?;
        let response = ensure_success(response).await?;

        let (tx, rx) = mpsc::unbounded();
        tokio::spawn(async move {
            if let Err(err) = pump_sse(response.bytes_stream(), &tx).await {
                tracing::warn!(%err, "chat stream ended with an error");
                let _ = tx.unbounded_send(Err(err));
            }
        });
        Ok(rx.boxed())
    }

    async fn submit_video(&self, request: &VideoRequest) -> GenerationResult<VideoOperation> {
        let url = self.model_url(&self.settings.video_model, "predictLongRunning");
        let body = PredictRequest {
            instances: vec![VeoInstance {
                prompt: request.prompt.as_deref(),
                image: VeoImage {
                    bytes_base64_encoded: request.image.base64(),
                    mime_type: request.image.mime_type.clone(),
                },
            }],
            parameters: VeoParameters {
                aspect_ratio: request.aspect_ratio.as_str(),
                resolution: VIDEO_RESOLUTION,
            },
        };
        let response = self.post(&url)?.json(&body).send().await?;
        let text = ensure_success(response).await?.text().await?;
        parse_operation(&text)
    }

    async fn poll_video(&self, operation: &VideoOperation) -> GenerationResult<VideoOperation> {
        let url = format!(
            "{}/v1beta/{}",
            self.settings.api_base.trim_end_matches('/'),
            operation.name
        );
        let response = self.get(&url)?.send().await?;
        let text = ensure_success(response).await?.text().await?;
        parse_operation(&text)
    }

    async fn download_video(&self, uri: &str) -> GenerationResult<Vec<u8>> {
        let response = self.get(uri)?.send().await?;
        let status = response.status();
        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("unknown status");
            return Err(GenerationError::Download(reason.to_string()));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|err| GenerationError::Download(err.to_string()))?;
        Ok(bytes.to_vec())
    }

    fn set_api_key(&self, key: Option<String>) {
        match self.api_key.write() {
            Ok(mut slot) => *slot = key,
            Err(_) => tracing::error!("credential lock poisoned, key not updated"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_stream_frames() {
        assert!(parse_gemini_sse_data("").is_none());
        assert!(parse_gemini_sse_data("not json").is_none());
        assert_eq!(
            parse_gemini_sse_data(
                r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Hel"},{"text":"lo"}]}}]}"#
            ),
            Some(StreamFrame::Text("Hello".into()))
        );
        assert_eq!(
            parse_gemini_sse_data(r#"{"candidates":[{"finishReason":"STOP"}]}"#),
            Some(StreamFrame::Text(String::new()))
        );
        assert_eq!(
            parse_gemini_sse_data(r#"{"error":{"code":500,"message":"overloaded"}}"#),
            Some(StreamFrame::Error("overloaded".into()))
        );
    }

    async fn pump_chunks(chunks: Vec<Vec<u8>>) -> Vec<String> {
        let (tx, rx) = mpsc::unbounded();
        let body = futures::stream::iter(chunks.into_iter().map(Ok::<_, reqwest::Error>));
        pump_sse(body, &tx).await.unwrap();
        drop(tx);
        rx.map(|piece| piece.unwrap()).collect().await
    }

    #[tokio::test]
    async fn keeps_characters_split_across_chunks() {
        let frame = "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"Olá\"}]}}]}\n\n";
        let bytes = frame.as_bytes();
        let split = bytes.iter().position(|byte| *byte == 0xC3).unwrap() + 1;
        let pieces = pump_chunks(vec![bytes[..split].to_vec(), bytes[split..].to_vec()]).await;
        assert_eq!(pieces, vec!["Olá".to_string()]);
    }

    #[tokio::test]
    async fn forwards_frames_across_crlf_lines() {
        let body = "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"Oi\"}]}}]}\r\n\r\n\
                    data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\", tudo?\"}]}}]}";
        let pieces = pump_chunks(vec![body.as_bytes().to_vec()]).await;
        assert_eq!(pieces, vec!["Oi".to_string(), ", tudo?".to_string()]);
    }

    #[test]
    fn extracts_first_inline_image() {
        let body = r#"{"candidates":[{"content":{"parts":[{"inlineData":{"mimeType":"image/png","data":"AAAA"}}]}}]}"#;
        assert_eq!(
            first_inline_image(body).unwrap(),
            Some(InlineImage {
                mime_type: "image/png".into(),
                data: "AAAA".into()
            })
        );

        let text_only = r#"{"candidates":[{"content":{"parts":[{"text":"I can't do that"}]}}]}"#;
        assert_eq!(first_inline_image(text_only).unwrap(), None);
        assert_eq!(first_inline_image(r#"{"candidates":[]}"#).unwrap(), None);
    }

    #[test]
    fn parses_operation_states() {
        let pending = parse_operation(r#"{"name":"models/veo/operations/42"}"#).unwrap();
        assert_eq!(pending.name, "models/veo/operations/42");
        assert!(!pending.done);
        assert!(pending.video_uri.is_none());

        let finished = parse_operation(
            r#"{"name":"ops/42","done":true,"response":{"generateVideoResponse":{"generatedSamples":[{"video":{"uri":"https://files/v.mp4"}}]}}}"#,
        )
        .unwrap();
        assert!(finished.done);
        assert_eq!(finished.video_uri.as_deref(), Some("https://files/v.mp4"));

        let failed =
            parse_operation(r#"{"name":"ops/42","done":true,"error":{"code":3,"message":"bad image"}}"#)
                .unwrap();
        assert_eq!(failed.error.as_deref(), Some("bad image"));
    }

    #[test]
    fn history_keeps_roles_and_appends_prompt() {
        let history = vec![ChatMessage::user("hi"), ChatMessage::model("hello")];
        let contents = history_contents(&history, "next");
        let roles: Vec<_> = contents.iter().map(|c| c.role.as_deref()).collect();
        assert_eq!(roles, vec![Some("user"), Some("model"), Some("user")]);
        assert_eq!(contents[2].parts[0].text.as_deref(), Some("next"));
    }
}
