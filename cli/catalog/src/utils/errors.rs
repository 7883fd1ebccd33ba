/// Join an error with all of its sources.
pub fn display_chain(mut err: &dyn std::error::Error) -> String {
    let mut fmt = err.to_string();
    while let Some(source) = err.source() {
        fmt = format!("{fmt}: {source}");
        err = source;
    }

    fmt
}

#[cfg(test)]
mod tests {
    use catalog_client::RequestError;
    use catalog_view::form::FormError;

    use super::*;

    #[test]
    fn chain_includes_sources() {
        let err = FormError::Request(RequestError::transport("connection refused"));
        assert_eq!(
            display_chain(&err),
            "Failed to create product: connection refused"
        );
    }
}
