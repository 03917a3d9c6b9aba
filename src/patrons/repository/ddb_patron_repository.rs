use std::cmp;
use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::AttributeValue;
use chrono::Utc;

use crate::core::library::{LibraryError, LibraryResult, PaginatedResult};
use crate::core::repository::Repository;
use crate::patrons::domain::model::PatronEntity;
use crate::patrons::repository::PatronRepository;
use crate::utils::ddb::{add_filter_expr, from_ddb, parse_date_attribute, parse_item, parse_number_attribute, parse_string_attribute, string_date, to_ddb_page, VERSION_CONDITION};

// `name` is a reserved word
const PATRON_UPDATE_EXPR: &str = "SET version = :version, patron_id = :patron_id, #name = :name, updated_at = :updated_at";

#[derive(Debug)]
pub struct DDBPatronRepository {
    client: Client,
    table_name: String,
    index_name: String,
}

impl DDBPatronRepository {
    pub(crate) fn new(client: Client, table_name: &str, index_name: &str) -> Self {
        Self {
            client,
            table_name: table_name.to_string(),
            index_name: index_name.to_string(),
        }
    }

    async fn scan(&self, predicate: &HashMap<String, String>,
                  page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<PatronEntity>> {
        let table_name: &str = self.table_name.as_ref();
        let exclusive_start_key = to_ddb_page(page, &HashMap::new());
        let mut request = self.client
            .scan()
            .table_name(table_name)
            .consistent_read(true)
            .set_exclusive_start_key(exclusive_start_key)
            .limit(cmp::min(page_size, 500) as i32);
        let mut filter_expr = String::new();
        for (k, v) in predicate {
            let ks = add_filter_expr(k.as_str(), &mut filter_expr);
            request = request
                .expression_attribute_names(format!("#{}", ks).as_str(), ks.as_str())
                .expression_attribute_values(format!(":{}", ks).as_str(), AttributeValue::S(v.to_string()));
        }
        if !filter_expr.is_empty() {
            request = request.filter_expression(filter_expr);
        }
        request
            .send()
            .await.map_err(LibraryError::from).map(|req| {
            let def_items = vec![];
            let items = req.items.as_ref().unwrap_or(&def_items);
            let records = items.iter().map(map_to_patron).collect();
            from_ddb(page, page_size, req.last_evaluated_key(), records)
        })
    }

    // consistent fallback for a patron the index has not caught up with
    async fn scan_first(&self, predicate: &HashMap<String, String>) -> LibraryResult<Option<PatronEntity>> {
        let mut page: Option<String> = None;
        loop {
            let res = self.scan(predicate, page.as_deref(), 500).await?;
            if let Some(patron) = res.records.into_iter().next() {
                return Ok(Some(patron));
            }
            match res.next_page {
                Some(next) => page = Some(next),
                None => return Ok(None),
            }
        }
    }
}

#[async_trait]
impl Repository<PatronEntity> for DDBPatronRepository {
    async fn create(&self, entity: &PatronEntity) -> LibraryResult<usize> {
        let table_name: &str = self.table_name.as_ref();
        let val = serde_json::to_value(entity)?;
        self.client
            .put_item()
            .table_name(table_name)
            .condition_expression("attribute_not_exists(id)")
            .set_item(Some(parse_item(val)?))
            .send()
            .await.map(|_| 1).map_err(LibraryError::from)
    }

    async fn update(&self, entity: &PatronEntity) -> LibraryResult<usize> {
        let table_name: &str = self.table_name.as_ref();
        self.client
            .update_item()
            .table_name(table_name)
            .key("id", AttributeValue::S(entity.id.clone()))
            .update_expression(PATRON_UPDATE_EXPR)
            .expression_attribute_names("#name", "name")
            .set_expression_attribute_values(Some(patron_update_values(entity)))
            .condition_expression(VERSION_CONDITION)
            .send()
            .await.map(|_| 1).map_err(LibraryError::from)
    }

    async fn get(&self, id: &str) -> LibraryResult<PatronEntity> {
        let table_name: &str = self.table_name.as_ref();
        self.client
            .query()
            .table_name(table_name)
            .limit(2)
            .consistent_read(true)
            .key_condition_expression("id = :id")
            .expression_attribute_values(":id", AttributeValue::S(id.to_string()))
            .send()
            .await.map_err(LibraryError::from).and_then(|req| {
            if let Some(items) = req.items {
                if items.len() > 1 {
                    return Err(LibraryError::database(format!("too many patrons for {}", id).as_str(), None, false));
                } else if let Some(map) = items.first() {
                    return Ok(map_to_patron(map));
                }
                Err(LibraryError::not_found(format!("patron item not found for {}", id).as_str()))
            } else {
                Err(LibraryError::not_found(format!("patron not found for {}", id).as_str()))
            }
        })
    }

    async fn delete(&self, id: &str) -> LibraryResult<usize> {
        let table_name: &str = self.table_name.as_ref();
        self.client.delete_item()
            .table_name(table_name)
            .key("id", AttributeValue::S(id.to_string()))
            .send()
            .await.map(|_| 1).map_err(LibraryError::from)
    }

    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<PatronEntity>> {
        let table_name: &str = self.table_name.as_ref();
        let index_name: &str = self.index_name.as_ref();
        let exclusive_start_key = to_ddb_page(page, predicate);
        let mut request = self.client
            .query()
            .table_name(table_name)
            .index_name(index_name)
            .limit(cmp::min(page_size, 500) as i32)
            .consistent_read(false)
            .set_exclusive_start_key(exclusive_start_key)
            .key_condition_expression("patron_id = :patron_id")
            .expression_attribute_values(":patron_id", AttributeValue::S(
                predicate.get("patron_id").map(String::as_str).unwrap_or("").to_string()
            ));
        let mut filter_expr = String::new();
        for (k, v) in predicate {
            if k != "patron_id" {
                let ks = add_filter_expr(k.as_str(), &mut filter_expr);
                request = request
                    .expression_attribute_names(format!("#{}", ks).as_str(), ks.as_str())
                    .expression_attribute_values(format!(":{}", ks).as_str(), AttributeValue::S(v.to_string()));
            }
        }
        if !filter_expr.is_empty() {
            request = request.filter_expression(filter_expr);
        }

        request
            .send()
            .await.map_err(LibraryError::from).map(|req| {
            let records = req.items.as_ref().unwrap_or(&vec![]).iter()
                .map(map_to_patron).collect();
            from_ddb(page, page_size, req.last_evaluated_key(), records)
        })
    }
}

#[async_trait]
impl PatronRepository for DDBPatronRepository {
    async fn save(&self, entity: &PatronEntity) -> LibraryResult<PatronEntity> {
        match self.get(entity.id.as_str()).await {
            Ok(_) => {
                self.update(entity).await?;
                self.get(entity.id.as_str()).await
            }
            Err(LibraryError::NotFound { .. }) => {
                self.create(entity).await?;
                Ok(entity.clone())
            }
            Err(err) => Err(err),
        }
    }

    async fn find_by_patron_id(&self, patron_id: &str) -> LibraryResult<Option<PatronEntity>> {
        let predicate = HashMap::from([
            ("patron_id".to_string(), patron_id.to_string()),
        ]);
        let res = self.query(&predicate, None, 2).await?;
        if res.records.len() > 1 {
            return Err(LibraryError::database(format!("too many patrons for {}", patron_id).as_str(), None, false));
        }
        // the index is eventually consistent, so reload the record from the table
        match res.records.first() {
            Some(found) => match self.get(found.id.as_str()).await {
                Ok(patron) => Ok(Some(patron)),
                Err(LibraryError::NotFound { .. }) => Ok(None),
                Err(err) => Err(err),
            },
            None => self.scan_first(&predicate).await,
        }
    }

    async fn find_all(&self, page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<PatronEntity>> {
        self.scan(&HashMap::new(), page, page_size).await
    }
}

fn patron_update_values(entity: &PatronEntity) -> HashMap<String, AttributeValue> {
    HashMap::from([
        (":old_version".to_string(), AttributeValue::N(entity.version.to_string())),
        (":version".to_string(), AttributeValue::N((entity.version + 1).to_string())),
        (":patron_id".to_string(), AttributeValue::S(entity.patron_id.to_string())),
        (":name".to_string(), AttributeValue::S(entity.name.to_string())),
        (":updated_at".to_string(), string_date(Utc::now().naive_utc())),
    ])
}

fn map_to_patron(map: &HashMap<String, AttributeValue>) -> PatronEntity {
    PatronEntity {
        id: parse_string_attribute("id", map).unwrap_or(String::from("")),
        version: parse_number_attribute("version", map),
        patron_id: parse_string_attribute("patron_id", map).unwrap_or(String::from("")),
        name: parse_string_attribute("name", map).unwrap_or(String::from("")),
        created_at: parse_date_attribute("created_at", map).unwrap_or(Utc::now().naive_utc()),
        updated_at: parse_date_attribute("updated_at", map).unwrap_or(Utc::now().naive_utc()),
    }
}

#[cfg(test)]
mod tests {
    use async_once::AsyncOnce;
    use aws_sdk_dynamodb::Client;
    use lazy_static::lazy_static;
    use uuid::Uuid;

    use crate::core::library::LibraryError;
    use crate::core::repository::{Repository, RepositoryStore};
    use crate::patrons::domain::model::PatronEntity;
    use crate::patrons::repository::ddb_patron_repository::DDBPatronRepository;
    use crate::patrons::repository::PatronRepository;
    use crate::utils::ddb::{build_db_client, create_table, delete_table};

    lazy_static! {
        static ref CLIENT: AsyncOnce<Client> = AsyncOnce::new(async {
                let client = build_db_client(RepositoryStore::LocalDynamoDB).await;
                let _ = delete_table(&client, "patrons").await;
                let _ = create_table(&client, "patrons", "id", "patron_id", "created_at").await;
                client
            });
    }

    #[tokio::test]
    #[ignore = "requires DynamoDB Local"]
    async fn test_should_create_get_patrons() {
        let patrons_repo = DDBPatronRepository::new(CLIENT.get().await.clone(), "patrons", "patrons_ndx");
        let patron = PatronEntity::new("Alice", Uuid::new_v4().to_string().as_str());
        assert_eq!(1, patrons_repo.create(&patron).await.expect("should create patron"));

        let loaded = patrons_repo.get(patron.id.as_str()).await.expect("should return patron");
        assert_eq!(patron.patron_id, loaded.patron_id);
        assert_eq!("Alice", loaded.name.as_str());
    }

    #[tokio::test]
    #[ignore = "requires DynamoDB Local"]
    async fn test_should_create_update_patrons() {
        let patrons_repo = DDBPatronRepository::new(CLIENT.get().await.clone(), "patrons", "patrons_ndx");
        let mut patron = PatronEntity::new("Alice", Uuid::new_v4().to_string().as_str());
        patrons_repo.create(&patron).await.expect("should create patron");

        patron.name = "Alice Liddell".to_string();
        assert_eq!(1, patrons_repo.update(&patron).await.expect("should update patron"));
        let loaded = patrons_repo.get(patron.id.as_str()).await.expect("should return patron");
        assert_eq!("Alice Liddell", loaded.name.as_str());
        assert_eq!(1, loaded.version);
        assert!(matches!(patrons_repo.update(&patron).await, Err(LibraryError::Conflict { .. })));
    }

    #[tokio::test]
    #[ignore = "requires DynamoDB Local"]
    async fn test_should_find_patrons_by_patron_id() {
        let patrons_repo = DDBPatronRepository::new(CLIENT.get().await.clone(), "patrons", "patrons_ndx");
        let patron_id = Uuid::new_v4().to_string();
        let patron = patrons_repo.save(&PatronEntity::new("Alice", patron_id.as_str())).await
            .expect("should save patron");
        let loaded = patrons_repo.find_by_patron_id(patron_id.as_str()).await.expect("should query patron");
        assert_eq!(Some(patron.id), loaded.map(|p| p.id));
        assert_eq!(None, patrons_repo.find_by_patron_id("UNKNOWN").await.expect("should query patron"));
    }

    #[tokio::test]
    #[ignore = "requires DynamoDB Local"]
    async fn test_should_create_delete_patrons() {
        let patrons_repo = DDBPatronRepository::new(CLIENT.get().await.clone(), "patrons", "patrons_ndx");
        let patron = PatronEntity::new("Alice", Uuid::new_v4().to_string().as_str());
        patrons_repo.create(&patron).await.expect("should create patron");
        assert_eq!(1, patrons_repo.delete(patron.id.as_str()).await.expect("should delete patron"));
        assert!(patrons_repo.get(patron.id.as_str()).await.is_err());
        let all = patrons_repo.find_all(None, 500).await.expect("should scan patrons");
        assert!(all.records.iter().all(|p| p.id != patron.id));
    }
}
