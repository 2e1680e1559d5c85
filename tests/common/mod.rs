// Shared fixtures: an in-memory generation backend driven by a closure.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use page_pipeline::analyst::RawProductRecord;
use page_pipeline::analyst::normalizer::{
    FIELD_BENEFITS, FIELD_CONCENTRATION, FIELD_HOW_TO_USE, FIELD_INGREDIENTS, FIELD_NAME,
    FIELD_PRICE, FIELD_SIDE_EFFECTS, FIELD_SKIN_TYPE,
};
use page_pipeline::clients::{
    GenerationBackend, GenerationError, GenerationRequest, ResilientClient, RetryPolicy,
};

pub type Reply = Result<String, GenerationError>;
type Responder = Box<dyn Fn(&GenerationRequest, usize) -> Reply + Send + Sync>;

pub struct ScriptedBackend {
    responder: Responder,
    calls: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedBackend {
    /// `f` sees each request plus its zero-based call index
    pub fn new(f: impl Fn(&GenerationRequest, usize) -> Reply + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            responder: Box::new(f),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Replies in order; once drained every call returns `"unscripted"`
    pub fn sequence(replies: Vec<Reply>) -> Arc<Self> {
        let queue = Mutex::new(VecDeque::from(replies));
        Self::new(move |_, _| {
            queue
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok("unscripted".to_string()))
        })
    }

    pub fn calls(&self) -> Vec<GenerationRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(request.clone());
            calls.len() - 1
        };
        (self.responder)(request, index)
    }
}

pub fn rate_limited() -> GenerationError {
    GenerationError::Http {
        status: 429,
        body: "Resource has been exhausted (e.g. check quota).".into(),
    }
}

pub fn server_error() -> GenerationError {
    GenerationError::Http {
        status: 500,
        body: "internal".into(),
    }
}

pub fn client(backend: Arc<ScriptedBackend>, max_attempts: u32) -> ResilientClient {
    ResilientClient::new(backend, RetryPolicy::immediate(max_attempts))
}

pub fn glowboost() -> RawProductRecord {
    RawProductRecord::new()
        .with(FIELD_NAME, "GlowBoost Vitamin C Serum")
        .with(FIELD_CONCENTRATION, "10% Vitamin C")
        .with(FIELD_SKIN_TYPE, "Oily, Combination")
        .with(FIELD_INGREDIENTS, "Vitamin C, Hyaluronic Acid")
        .with(FIELD_BENEFITS, "Brightening, Fades dark spots")
        .with(FIELD_HOW_TO_USE, "Apply 2-3 drops in the morning before sunscreen")
        .with(FIELD_SIDE_EFFECTS, "Mild tingling for sensitive skin")
        .with(FIELD_PRICE, "₹699")
}

pub const QUESTIONS_JSON: &str = r#"{"questions": [
    {"category": "Informational", "question_text": "What does GlowBoost do?"},
    {"category": "Safety", "question_text": "Is it safe for sensitive skin?"},
    {"category": "Usage", "question_text": "When should I apply it?"},
    {"category": "Safety", "question_text": "Can I use it during pregnancy?"},
    {"category": "Purchase", "question_text": "Where can I buy it?"},
    {"category": "Safety", "question_text": "Does it cause breakouts?"},
    {"category": "Comparison", "question_text": "How does it compare to RadiantC?"}
]}"#;

pub const COMPETITOR_JSON: &str = r#"{"name": "RadiantC Serum", "key_ingredients": ["Ascorbic Acid", "Niacinamide"], "benefits": ["Even tone"], "price": 899}"#;

/// Answers each call by directive, the way a well-behaved service would
pub fn well_behaved(request: &GenerationRequest, _index: usize) -> Reply {
    let directive = request.system_directive.as_str();
    let text = if directive.contains("data generation") {
        QUESTIONS_JSON.to_string()
    } else if directive.contains("product strategist") {
        COMPETITOR_JSON.to_string()
    } else if directive.contains("customer support") {
        format!("Answer: {}  ", request.user_content.len())
    } else {
        "Generated copy.".to_string()
    };
    Ok(text)
}
