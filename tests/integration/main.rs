mod cli_test;
mod pipeline_test;
