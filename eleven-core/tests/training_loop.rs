use eleven_core::error::ElevenError;
use eleven_core::model::{LeNet, Sequential};
use eleven_core::nn::{CrossEntropyLoss, Linear, Module, ReLU};
use eleven_core::optim::{Optimizer, Sgd};
use eleven_core::tensor::Tensor;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

mod common;
use common::create_test_tensor;

/// Two Gaussian blobs around (-1, -1) and (1, 1).
fn blobs(rng: &mut StdRng, per_class: usize) -> (Tensor, Tensor) {
    let noise = Normal::new(0.0f32, 0.3).expect("valid std dev");
    let mut points = Vec::with_capacity(per_class * 4);
    let mut labels = Vec::with_capacity(per_class * 2);
    for i in 0..per_class * 2 {
        let class = i % 2;
        let center = if class == 0 { -1.0 } else { 1.0 };
        points.push(center + noise.sample(rng));
        points.push(center + noise.sample(rng));
        labels.push(class as f32);
    }
    let n = labels.len();
    (create_test_tensor(points, &[n, 2]), create_test_tensor(labels, &[n]))
}

fn train_step(
    model: &dyn Module,
    optimizer: &mut Sgd,
    inputs: &Tensor,
    labels: &Tensor,
) -> Result<f32, ElevenError> {
    optimizer.zero_grad()?;
    let scores = model.forward(&inputs.node())?;
    let loss = CrossEntropyLoss::new().forward(&scores, labels)?;
    let value = loss.tensor()?.item()?;
    loss.backward()?;
    optimizer.step()?;
    Ok(value)
}

#[test]
fn test_mlp_learns_separable_blobs() -> Result<(), ElevenError> {
    let mut rng = StdRng::seed_from_u64(42);
    let (inputs, labels) = blobs(&mut rng, 16);
    let model = Sequential::new()
        .with("fc1", Linear::new_with_rng(2, 8, &mut rng)?)?
        .with("relu", ReLU)?
        .with("fc2", Linear::new_with_rng(8, 2, &mut rng)?)?;
    let mut optimizer = Sgd::new(model.parameters(), 0.2);

    let first = train_step(&model, &mut optimizer, &inputs, &labels)?;
    let mut last = first;
    for _ in 0..60 {
        last = train_step(&model, &mut optimizer, &inputs, &labels)?;
    }
    assert!(last.is_finite());
    assert!(last < first * 0.5, "loss went from {} to {}", first, last);
    Ok(())
}

#[test]
fn test_lenet_step_reduces_batch_loss() -> Result<(), ElevenError> {
    let mut rng = StdRng::seed_from_u64(7);
    let model = LeNet::new_with_rng(&mut rng)?;
    let pixels: Vec<f32> = (0..2 * 28 * 28).map(|_| rng.gen_range(0.0..1.0)).collect();
    let images = create_test_tensor(pixels, &[2, 1, 28, 28]);
    let labels = create_test_tensor(vec![1.0, 7.0], &[2]);
    let mut optimizer = Sgd::new(model.parameters(), 0.05);
    let versions: Vec<u64> = model.parameters().iter().map(|(_, p)| p.version()).collect();

    let before = train_step(&model, &mut optimizer, &images, &labels)?;
    let after = train_step(&model, &mut optimizer, &images, &labels)?;
    assert!(after < before, "loss went from {} to {}", before, after);
    for ((name, param), version) in model.parameters().into_iter().zip(versions) {
        assert_eq!(param.version(), version + 2, "{} was not updated twice", name);
    }
    Ok(())
}
