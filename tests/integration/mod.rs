mod cli_tests;
mod pipeline_tests;
