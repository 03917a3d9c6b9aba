pub mod add_book_cmd;
pub mod add_patron_cmd;
pub mod checkout_book_cmd;
pub mod list_books_cmd;
pub mod list_patrons_cmd;
pub mod return_book_cmd;
