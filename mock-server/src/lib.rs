use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Topic {
    pub name: String,
    pub id: i64,
}

/// A stored subscription. Responses always carry every key, null standing
/// in for values that were never set.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Subscription {
    pub queue: String,
    pub topics: Vec<Value>,
    pub active: bool,
    pub qos: Option<String>,
    pub durable: bool,
    pub id: i64,
}

#[derive(Deserialize)]
pub struct CreateTopic {
    pub name: String,
}

/// Creation/replacement payload. Topic entries are kept verbatim, whether
/// reference tokens or expanded objects, and echoed back unchanged.
#[derive(Deserialize)]
pub struct SubscriptionInput {
    #[serde(default)]
    pub topics: Vec<Value>,
    pub active: Option<bool>,
    pub qos: Option<String>,
    pub durable: Option<bool>,
}

#[derive(Deserialize)]
struct SubscriptionFilter {
    queue: Option<String>,
}

#[derive(Default)]
pub struct Store {
    topics: HashMap<i64, Topic>,
    subscriptions: HashMap<i64, Subscription>,
    next_id: i64,
}

impl Store {
    fn assign_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    let api = Router::new()
        .route("/topics/", get(list_topics).post(create_topic))
        .route("/topics/own", get(list_own_topics))
        .route("/topics/{id}", get(get_topic).delete(delete_topic))
        .route(
            "/subscriptions/",
            get(list_subscriptions).post(create_subscription),
        )
        .route(
            "/subscriptions/{id}",
            get(get_subscription)
                .put(replace_subscription)
                .delete(delete_subscription),
        )
        .route("/ping-credentials", get(ping_credentials));
    Router::new()
        .nest("/subscription-manager/api/1.0", api)
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn topics_by_id(store: &Store) -> Vec<Topic> {
    let mut topics: Vec<Topic> = store.topics.values().cloned().collect();
    topics.sort_by_key(|topic| topic.id);
    topics
}

async fn list_topics(State(db): State<Db>) -> Json<Vec<Topic>> {
    let store = db.read().await;
    Json(topics_by_id(&store))
}

// The mock is single-tenant: the caller owns every topic.
async fn list_own_topics(State(db): State<Db>) -> Json<Vec<Topic>> {
    let store = db.read().await;
    Json(topics_by_id(&store))
}

async fn get_topic(State(db): State<Db>, Path(id): Path<i64>) -> Result<Json<Topic>, StatusCode> {
    let store = db.read().await;
    store.topics.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn create_topic(
    State(db): State<Db>,
    Json(input): Json<CreateTopic>,
) -> (StatusCode, Json<Topic>) {
    let mut store = db.write().await;
    let id = store.assign_id();
    let topic = Topic {
        name: input.name,
        id,
    };
    store.topics.insert(id, topic.clone());
    (StatusCode::CREATED, Json(topic))
}

async fn delete_topic(
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> Result<StatusCode, StatusCode> {
    let mut store = db.write().await;
    store
        .topics
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn list_subscriptions(
    State(db): State<Db>,
    Query(filter): Query<SubscriptionFilter>,
) -> Json<Vec<Subscription>> {
    let store = db.read().await;
    let mut subscriptions: Vec<Subscription> = store
        .subscriptions
        .values()
        .filter(|subscription| {
            filter
                .queue
                .as_deref()
                .map_or(true, |queue| subscription.queue == queue)
        })
        .cloned()
        .collect();
    subscriptions.sort_by_key(|subscription| subscription.id);
    Json(subscriptions)
}

async fn get_subscription(
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> Result<Json<Subscription>, StatusCode> {
    let store = db.read().await;
    store
        .subscriptions
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn create_subscription(
    State(db): State<Db>,
    Json(input): Json<SubscriptionInput>,
) -> (StatusCode, Json<Subscription>) {
    let mut store = db.write().await;
    let id = store.assign_id();
    let subscription = Subscription {
        queue: Uuid::new_v4().to_string(),
        topics: input.topics,
        active: input.active.unwrap_or(true),
        qos: input.qos,
        durable: input.durable.unwrap_or(false),
        id,
    };
    store.subscriptions.insert(id, subscription.clone());
    (StatusCode::CREATED, Json(subscription))
}

// Wholesale replacement; only the assigned queue and id survive.
async fn replace_subscription(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<SubscriptionInput>,
) -> Result<Json<Subscription>, StatusCode> {
    let mut store = db.write().await;
    let subscription = store.subscriptions.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    subscription.topics = input.topics;
    subscription.active = input.active.unwrap_or(true);
    subscription.qos = input.qos;
    subscription.durable = input.durable.unwrap_or(false);
    Ok(Json(subscription.clone()))
}

async fn delete_subscription(
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> Result<StatusCode, StatusCode> {
    let mut store = db.write().await;
    store
        .subscriptions
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn ping_credentials() -> StatusCode {
    StatusCode::OK
}
