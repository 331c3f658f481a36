//! Training entry point.
//!
//! One operation, no arguments: assemble the dataset, print the declared
//! topology, train for the configured epochs, report the held-out error.
//! All hyperparameters are in-process constants from the default config.

use price_pipeline::{
    config::PipelineConfig,
    dataset::DatasetAssembler,
    network::{MlpTrainer, TopologySpec, TrainOptions, Trainer},
    stream::EpochStream,
};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = PipelineConfig::default();
    config.validate()?;

    // 1. Assemble the dataset once; it is reused for the whole run.
    let assembler = DatasetAssembler::new(config.data.clone());
    let dataset = assembler.assemble()?;

    // 2. Carve off the fixed-size held-out slice.
    let (train, test) = dataset.split_holdout(config.training.test_size)?;

    // 3. Declare the topology and show it before training starts.
    let topology = TopologySpec::regression(train.feature_width());
    println!("{}", topology);

    // 4. Stream shuffled batches into the trainer.
    let mut stream = EpochStream::new(
        train.examples,
        config.training.epoch_size,
        config.training.seed,
    )?;
    let options = TrainOptions {
        batch_size: config.training.batch_size,
        epoch_count: config.training.epoch_count,
        optimizer: config.training.optimizer.clone(),
    };
    let trainer = match config.training.seed {
        Some(seed) => MlpTrainer::new().with_seed(seed),
        None => MlpTrainer::new(),
    };
    let model = trainer.train(&topology, &mut stream, &test.examples, &options)?;

    // 5. Final held-out error.
    let rmse = model.evaluate(&test.examples);
    log::info!("final held-out rmse: {:.2}", rmse);

    Ok(())
}
