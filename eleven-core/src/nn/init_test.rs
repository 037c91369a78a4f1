use super::{constant_, kaiming_uniform_, uniform_};
use crate::error::ElevenError;
use crate::tensor::zeros;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn test_uniform_bounds_and_version() -> Result<(), ElevenError> {
    let mut rng = StdRng::seed_from_u64(7);
    let t = zeros(&[10, 10])?;
    uniform_(&t, -0.5, 0.5, &mut rng)?;
    assert!(t.to_vec().iter().all(|v| (-0.5..0.5).contains(v)));
    assert_eq!(t.version(), 1);
    assert!(uniform_(&t, 1.0, 1.0, &mut rng).is_err());
    Ok(())
}

#[test]
fn test_kaiming_uniform_bound() -> Result<(), ElevenError> {
    let mut rng = StdRng::seed_from_u64(3);
    let t = zeros(&[64, 24])?;
    kaiming_uniform_(&t, 24, &mut rng)?;
    let bound = 0.5;
    assert!(t.to_vec().iter().all(|v| v.abs() <= bound));
    Ok(())
}

#[test]
fn test_constant_fill() -> Result<(), ElevenError> {
    let t = zeros(&[3])?;
    constant_(&t, 0.25)?;
    assert_eq!(t.to_vec(), vec![0.25; 3]);
    Ok(())
}
