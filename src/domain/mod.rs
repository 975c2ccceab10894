// Domain layer - chart payload decoding and reshaping
pub mod chart_request;
pub mod chart_series;
pub mod encoded_vector;
pub mod flatten;
pub mod record_table;
pub mod view;
