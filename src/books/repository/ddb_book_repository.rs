use std::cmp;
use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::{AttributeValue, Update};
use chrono::Utc;

use crate::books::domain::model::BookEntity;
use crate::books::repository::BookRepository;
use crate::core::library::{LibraryError, LibraryResult, PaginatedResult};
use crate::core::repository::Repository;
use crate::utils::ddb::{add_filter_expr, from_ddb, opt_string, parse_date_attribute, parse_item, parse_number_attribute, parse_string_attribute, string_date, to_ddb_page, VERSION_CONDITION};

const BOOK_UPDATE_EXPR: &str = "SET version = :version, isbn = :isbn, title = :title, author = :author, borrowed_by = :borrowed_by, updated_at = :updated_at";

#[derive(Debug)]
pub struct DDBBookRepository {
    client: Client,
    table_name: String,
    index_name: String,
}

impl DDBBookRepository {
    pub(crate) fn new(client: Client, table_name: &str, index_name: &str) -> Self {
        Self {
            client,
            table_name: table_name.to_string(),
            index_name: index_name.to_string(),
        }
    }

    async fn scan(&self, predicate: &HashMap<String, String>,
                  page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<BookEntity>> {
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
            let records = items.iter().map(map_to_book).collect();
            from_ddb(page, page_size, req.last_evaluated_key(), records)
        })
    }

    async fn scan_all(&self, predicate: &HashMap<String, String>) -> LibraryResult<Vec<BookEntity>> {
        let mut books = vec![];
        let mut page: Option<String> = None;
        loop {
            let res = self.scan(predicate, page.as_deref(), 500).await?;
            books.extend(res.records);
            match res.next_page {
                Some(next) => page = Some(next),
                None => break,
            }
        }
        Ok(books)
    }
}

#[async_trait]
impl Repository<BookEntity> for DDBBookRepository {
    async fn create(&self, entity: &BookEntity) -> LibraryResult<usize> {
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

    async fn update(&self, entity: &BookEntity) -> LibraryResult<usize> {
        let table_name: &str = self.table_name.as_ref();
        self.client
            .update_item()
            .table_name(table_name)
            .key("id", AttributeValue::S(entity.id.clone()))
            .update_expression(BOOK_UPDATE_EXPR)
            .set_expression_attribute_values(Some(book_update_values(entity)))
            .condition_expression(VERSION_CONDITION)
            .send()
            .await.map(|_| 1).map_err(LibraryError::from)
    }

    async fn get(&self, id: &str) -> LibraryResult<BookEntity> {
        let table_name: &str = self.table_name.as_ref();
        self.client
            .query()
            .table_name(table_name)
            .limit(2)
            .consistent_read(true)
            .key_condition_expression(
                "id = :id",
            )
            .expression_attribute_values(
                ":id",
                AttributeValue::S(id.to_string()),
            )
            .send()
            .await.map_err(LibraryError::from).and_then(|req| {
            if let Some(items) = req.items {
                if items.len() > 1 {
                    return Err(LibraryError::database(format!("too many books for {}", id).as_str(), None, false));
                } else if let Some(map) = items.first() {
                    return Ok(map_to_book(map));
                }
                Err(LibraryError::not_found(format!("book item not found for {}", id).as_str()))
            } else {
                Err(LibraryError::not_found(format!("book not found for {}", id).as_str()))
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

    // queries the isbn index when the predicate names an isbn, otherwise falls back to a filtered scan
    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<BookEntity>> {
        let isbn = match predicate.get("isbn") {
            Some(isbn) => isbn,
            None => return self.scan(predicate, page, page_size).await,
        };
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
            .expression_attribute_values(":isbn", AttributeValue::S(isbn.to_string()));
        // handle GSI keys first
        let mut key_cond = String::new();
        key_cond.push_str("isbn = :isbn");

        if let Some(title) = predicate.get("title") {
            key_cond.push_str(" AND title = :title");
            request = request.expression_attribute_values(":title", AttributeValue::S(title.to_string()));
        }
        request = request.key_condition_expression(key_cond);
        let mut filter_expr = String::new();
        // then handle other filters
        for (k, v) in predicate {
            if k != "isbn" && k != "title" {
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
                .map(map_to_book).collect();
            from_ddb(page, page_size, req.last_evaluated_key(), records)
        })
    }
}

#[async_trait]
impl BookRepository for DDBBookRepository {
    async fn save(&self, entity: &BookEntity) -> LibraryResult<BookEntity> {
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

    async fn find_by_isbn(&self, isbn: &str) -> LibraryResult<Option<BookEntity>> {
        let predicate = HashMap::from([
            ("isbn".to_string(), isbn.to_string()),
        ]);
        let res = self.query(&predicate, None, 2).await?;
        if res.records.len() > 1 {
            return Err(LibraryError::database(format!("too many books for {}", isbn).as_str(), None, false));
        }
        // the index lags behind loans, so reload the record with a consistent read
        match res.records.first() {
            Some(found) => match self.get(found.id.as_str()).await {
                Ok(book) => Ok(Some(book)),
                Err(LibraryError::NotFound { .. }) => Ok(None),
                Err(err) => Err(err),
            },
            // a book added a moment ago may not be indexed yet
            None => Ok(self.scan_all(&predicate).await?.into_iter().next()),
        }
    }

    async fn find_all(&self, page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<BookEntity>> {
        self.scan(&HashMap::new(), page, page_size).await
    }

    async fn find_borrowed_by(&self, patron_key: &str) -> LibraryResult<Vec<BookEntity>> {
        let predicate = HashMap::from([
            ("borrowed_by".to_string(), patron_key.to_string()),
        ]);
        self.scan_all(&predicate).await
    }
}

fn book_update_values(entity: &BookEntity) -> HashMap<String, AttributeValue> {
    HashMap::from([
        (":old_version".to_string(), AttributeValue::N(entity.version.to_string())),
        (":version".to_string(), AttributeValue::N((entity.version + 1).to_string())),
        (":isbn".to_string(), AttributeValue::S(entity.isbn.to_string())),
        (":title".to_string(), AttributeValue::S(entity.title.to_string())),
        (":author".to_string(), AttributeValue::S(entity.author.to_string())),
        (":borrowed_by".to_string(), opt_string(&entity.borrowed_by)),
        (":updated_at".to_string(), string_date(Utc::now().naive_utc())),
    ])
}

// the versioned update of a book as one item of a write transaction
pub(crate) fn book_update(table_name: &str, entity: &BookEntity) -> Update {
    Update::builder()
        .table_name(table_name)
        .key("id", AttributeValue::S(entity.id.clone()))
        .update_expression(BOOK_UPDATE_EXPR)
        .set_expression_attribute_values(Some(book_update_values(entity)))
        .condition_expression(VERSION_CONDITION)
        .build()
}

fn map_to_book(map: &HashMap<String, AttributeValue>) -> BookEntity {
    BookEntity {
        id: parse_string_attribute("id", map).unwrap_or(String::from("")),
        version: parse_number_attribute("version", map),
        isbn: parse_string_attribute("isbn", map).unwrap_or(String::from("")),
        title: parse_string_attribute("title", map).unwrap_or(String::from("")),
        author: parse_string_attribute("author", map).unwrap_or(String::from("")),
        borrowed_by: parse_string_attribute("borrowed_by", map),
        created_at: parse_date_attribute("created_at", map).unwrap_or(Utc::now().naive_utc()),
        updated_at: parse_date_attribute("updated_at", map).unwrap_or(Utc::now().naive_utc()),
    }
}
