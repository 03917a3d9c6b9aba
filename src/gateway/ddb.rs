pub mod unit_of_work;
