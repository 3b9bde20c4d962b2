use kube::CustomResourceExt;
use mediatailor_operator::crd::{
    Channel, LiveSource, PlaybackConfiguration, SourceLocation, VodSource,
};

fn main() -> anyhow::Result<()> {
    let crds = [
        Channel::crd(),
        SourceLocation::crd(),
        VodSource::crd(),
        LiveSource::crd(),
        PlaybackConfiguration::crd(),
    ];

    for (i, crd) in crds.iter().enumerate() {
        if i > 0 {
            println!("---");
        }
        print!("{}", serde_yaml::to_string(crd)?);
    }
    Ok(())
}
