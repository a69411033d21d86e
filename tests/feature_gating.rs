#[test]
fn tracing_feature_gating_compiles() {
    #[cfg(feature = "tracing")]
    {
        tracing::event!(
            tracing::Level::DEBUG,
            event = "streampipe.test.feature_gating",
            "streampipe.test.feature_gating"
        );
    }

    #[cfg(not(feature = "tracing"))]
    {
        let marker = "tracing-disabled";
        assert_eq!(marker, "tracing-disabled");
    }
}

#[cfg(feature = "tracing")]
#[tokio::test]
async fn pipeline_runs_under_a_subscriber() -> streampipe::error::Result<()> {
    use streampipe::pipeline::cancel::CancelToken;
    use streampipe::pipeline::stream::Stream;

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter("streampipe=trace")
        .with_test_writer()
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let token = CancelToken::new();
    let err = Stream::from_seq(&token, 0u32..)
        .map(|_, v| async move {
            if v == 3 {
                return Err(streampipe::error::Error::pipeline("stop"));
            }
            Ok(v)
        })
        .collect()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        streampipe::error::Error::Pipeline { context: "stop" }
    ));
    Ok(())
}
