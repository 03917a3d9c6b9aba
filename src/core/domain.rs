// Identifiable defines common traits that can be shared by persistent objects
pub trait Identifiable : Sync + Send {
    fn id(&self) -> String;
    fn version(&self) -> i64;
}

// Configuration abstracts config options for library system
#[derive(Debug, PartialEq, Clone)]
pub(crate) struct Configuration {
    pub branch_id: String,
    pub books_table: String,
    pub patrons_table: String,
    // page size used when draining full listings from the store
    pub page_size: usize,
}

impl Configuration {
    pub fn new(branch_id: &str) -> Self {
        Configuration {
            branch_id: branch_id.to_string(),
            books_table: "books".to_string(),
            patrons_table: "patrons".to_string(),
            page_size: 100,
        }
    }

    pub fn books_index(&self) -> String {
        format!("{}_ndx", self.books_table)
    }

    pub fn patrons_index(&self) -> String {
        format!("{}_ndx", self.patrons_table)
    }
}

#[cfg(test)]
mod tests {
    use crate::core::domain::Configuration;

    #[tokio::test]
    async fn test_should_build_config() {
        let config = Configuration::new("test");
        assert_eq!("test", config.branch_id.as_str());
        assert_eq!("books", config.books_table.as_str());
        assert_eq!("patrons_ndx", config.patrons_index().as_str());
        assert_eq!(100, config.page_size);
    }
}
