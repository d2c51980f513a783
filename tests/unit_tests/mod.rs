mod batch;
mod metrics;
mod scenarios;
mod tensor;
