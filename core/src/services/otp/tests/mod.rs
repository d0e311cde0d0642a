mod concurrency_tests;
mod issuance_tests;
