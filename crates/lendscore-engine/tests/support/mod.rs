pub mod testkit;
