// file: src/aws.rs
// description: shared AWS SDK configuration loading for service clients
// reference: https://docs.rs/aws-config

use crate::config::AwsConfig;
use aws_config::{BehaviorVersion, Region, SdkConfig};

/// Builds the shared SDK configuration used by every AWS service client.
///
/// Credentials come from the default provider chain (environment,
/// profile, instance metadata). The region is taken from configuration
/// and an optional endpoint override supports local stacks.
pub async fn sdk_config(aws: &AwsConfig) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(aws.region.clone()));

    if let Some(endpoint) = &aws.endpoint_url {
        loader = loader.endpoint_url(endpoint);
    }

    loader.load().await
}
