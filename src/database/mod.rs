use crate::models::User;
use crate::utils::error::AppError;
use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, Bson, Document};
use mongodb::{Client, Collection, Database, IndexModel};
use std::error::Error;

#[cfg(test)]
pub mod memory;

pub const USERS_COLLECTION: &str = "users";
pub const ITEMS_COLLECTION: &str = "items";

/// Persistence operations the HTTP layer needs. Every method is a single
/// database round-trip; nothing here spans more than one call.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn insert_user(&self, user: &User) -> Result<(), AppError>;

    /// Returns the number of users matched by `email`.
    async fn set_linked_id(&self, email: &str, linked_id: &str) -> Result<u64, AppError>;

    /// Every user with a `user_items` array of the items whose `user_id`
    /// equals the user's `linked_id`.
    async fn users_with_items(&self) -> Result<Vec<Document>, AppError>;

    async fn delete_user_by_email(&self, email: &str) -> Result<u64, AppError>;

    async fn delete_items_by_user_id(&self, user_id: &str) -> Result<u64, AppError>;

    async fn ping(&self) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct MongoDB {
    client: Client,
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str, db_name: &str) -> Result<Self, Box<dyn Error>> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(2);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));

        client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));

        let client = Client::with_options(client_options)?;
        let db = client.database(db_name);

        // Test connection
        db.list_collection_names().await?;

        let mongodb = Self { client, db };
        mongodb.ensure_indexes().await;

        Ok(mongodb)
    }

    /// Lookup indexes only. Email uniqueness is still checked by the
    /// application, so no unique constraint is declared here.
    async fn ensure_indexes(&self) {
        log::info!("🔧 Creating database indexes...");

        let indexes = [
            (USERS_COLLECTION, "email"),
            (ITEMS_COLLECTION, "user_id"),
        ];

        for (collection, field) in indexes {
            let mut keys = Document::new();
            keys.insert(field, 1);
            let index = IndexModel::builder().keys(keys).build();

            match self.collection::<Document>(collection).create_index(index).await {
                Ok(_) => log::info!("   ✅ Index created: {}({})", collection, field),
                Err(e) => log::debug!("   ℹ️  Index not created on {}({}): {}", collection, field, e),
            }
        }

        log::info!("✅ Database indexes ready");
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Closes the connection pool. Call once, after the HTTP server stops.
    pub async fn shutdown(&self) {
        self.client.clone().shutdown().await;
        log::info!("🔌 Disconnected from the MongoDB database");
    }

    fn users(&self) -> Collection<User> {
        self.collection(USERS_COLLECTION)
    }
}

#[async_trait]
impl UserStore for MongoDB {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.users().find_one(doc! { "email": email }).await?)
    }

    async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        self.users().insert_one(user).await?;
        Ok(())
    }

    async fn set_linked_id(&self, email: &str, linked_id: &str) -> Result<u64, AppError> {
        let result = self
            .users()
            .update_one(
                doc! { "email": email },
                doc! { "$set": { "linked_id": linked_id } },
            )
            .await?;
        Ok(result.matched_count)
    }

    async fn users_with_items(&self) -> Result<Vec<Document>, AppError> {
        let cursor = self
            .collection::<Document>(USERS_COLLECTION)
            .aggregate(users_with_items_pipeline())
            .await?;

        let users: Vec<Document> = cursor.try_collect().await?;
        Ok(users)
    }

    async fn delete_user_by_email(&self, email: &str) -> Result<u64, AppError> {
        let result = self.users().delete_one(doc! { "email": email }).await?;
        Ok(result.deleted_count)
    }

    async fn delete_items_by_user_id(&self, user_id: &str) -> Result<u64, AppError> {
        let result = self
            .collection::<Document>(ITEMS_COLLECTION)
            .delete_many(doc! { "user_id": user_id })
            .await?;
        Ok(result.deleted_count)
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}

/// `$lookup` joins a missing localField against items whose `user_id` is
/// null or missing, so unlinked users get their array reset to `[]`.
pub fn users_with_items_pipeline() -> Vec<Document> {
    vec![
        doc! {
            "$lookup": {
                "from": ITEMS_COLLECTION,
                "localField": "linked_id",
                "foreignField": "user_id",
                "as": "user_items"
            }
        },
        doc! {
            "$addFields": {
                "user_items": {
                    "$cond": [
                        { "$ifNull": ["$linked_id", false] },
                        "$user_items",
                        []
                    ]
                }
            }
        },
    ]
}

/// Renders a BSON document as plain JSON. ObjectIds become hex strings;
/// everything else uses relaxed extended JSON.
pub fn document_to_json(document: Document) -> serde_json::Value {
    bson_to_json(Bson::Document(document))
}

fn bson_to_json(value: Bson) -> serde_json::Value {
    match value {
        Bson::ObjectId(oid) => serde_json::Value::String(oid.to_hex()),
        Bson::Document(document) => serde_json::Value::Object(
            document
                .into_iter()
                .map(|(key, value)| (key, bson_to_json(value)))
                .collect(),
        ),
        Bson::Array(values) => {
            serde_json::Value::Array(values.into_iter().map(bson_to_json).collect())
        }
        other => other.into_relaxed_extjson(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::oid::ObjectId;

    #[test]
    fn test_document_to_json_flattens_object_ids() {
        let user_id = ObjectId::new();
        let item_id = ObjectId::new();
        let document = doc! {
            "_id": user_id,
            "username": "alice",
            "user_items": [ { "_id": item_id, "user_id": "ext-1", "qty": 3 } ]
        };

        let json = document_to_json(document);

        assert_eq!(json["_id"], serde_json::json!(user_id.to_hex()));
        assert_eq!(json["username"], "alice");
        assert_eq!(json["user_items"][0]["_id"], serde_json::json!(item_id.to_hex()));
        assert_eq!(json["user_items"][0]["qty"], 3);
    }

    #[test]
    fn test_users_with_items_pipeline() {
        let pipeline = users_with_items_pipeline();
        assert_eq!(pipeline.len(), 2);

        let lookup = pipeline[0].get_document("$lookup").unwrap();
        assert_eq!(lookup.get_str("from").unwrap(), ITEMS_COLLECTION);
        assert_eq!(lookup.get_str("localField").unwrap(), "linked_id");
        assert_eq!(lookup.get_str("foreignField").unwrap(), "user_id");
        assert_eq!(lookup.get_str("as").unwrap(), "user_items");

        // Without a linked_id the joined array must be replaced by [].
        let add_fields = pipeline[1].get_document("$addFields").unwrap();
        let cond = add_fields
            .get_document("user_items")
            .unwrap()
            .get_array("$cond")
            .unwrap();
        assert_eq!(cond.len(), 3);
        assert_eq!(
            cond[0],
            Bson::Document(doc! { "$ifNull": ["$linked_id", false] })
        );
        assert_eq!(cond[1], Bson::String("$user_items".to_string()));
        assert_eq!(cond[2], Bson::Array(vec![]));
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_mongodb_round_trip() {
        dotenv::dotenv().ok();

        let uri = std::env::var("MONGO_DETAILS")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let db = MongoDB::new(&uri, "user_db_test").await.unwrap();
        db.database().drop().await.unwrap();
        assert!(db.ping().await.is_ok());

        let user = User {
            id: None,
            username: "alice".into(),
            email: "alice@example.com".into(),
            hashed_password: "$2b$04$hash".into(),
            linked_id: None,
        };
        db.insert_user(&user).await.unwrap();
        db.collection::<Document>(ITEMS_COLLECTION)
            .insert_many(vec![doc! { "user_id": "ext-1" }, doc! { "name": "orphan" }])
            .await
            .unwrap();

        let joined = db.users_with_items().await.unwrap();
        assert_eq!(joined.len(), 1);
        assert!(joined[0].get_array("user_items").unwrap().is_empty());

        assert_eq!(db.set_linked_id("alice@example.com", "ext-1").await.unwrap(), 1);
        let joined = db.users_with_items().await.unwrap();
        assert_eq!(joined[0].get_array("user_items").unwrap().len(), 1);

        assert_eq!(db.delete_user_by_email("alice@example.com").await.unwrap(), 1);
        assert_eq!(db.delete_items_by_user_id("ext-1").await.unwrap(), 1);

        db.database().drop().await.unwrap();
        db.shutdown().await;
    }
}
