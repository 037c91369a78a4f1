use rand::Rng;

use crate::error::ElevenError;
use crate::nn::init::uniform_;
use crate::nn::module::Module;
use crate::node::Node;
use crate::ops::arithmetic::add_op;
use crate::ops::linalg::img2col::Img2ColGeometry;
use crate::ops::linalg::{bmm_op, img2col_op};
use crate::tensor::{zeros, Tensor};

/// Stride and zero padding of a [`Conv2d`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conv2dOptions {
    pub stride: usize,
    pub padding: usize,
}

impl Default for Conv2dOptions {
    fn default() -> Self {
        Conv2dOptions { stride: 1, padding: 0 }
    }
}

/// 2D convolution with a square kernel, computed as a batched product of
/// the flattened kernels with the img2col columns of the input.
#[derive(Debug)]
pub struct Conv2d {
    /// `(1, out_channels, in_channels·k·k)`
    weight: Tensor,
    /// `(1, out_channels, 1)`
    bias: Tensor,
    in_channels: usize,
    out_channels: usize,
    kernel: usize,
    options: Conv2dOptions,
}

impl Conv2d {
    pub fn new(
        in_channels: usize,
        out_channels: usize,
        kernel: usize,
        options: Conv2dOptions,
    ) -> Result<Self, ElevenError> {
        Conv2d::new_with_rng(in_channels, out_channels, kernel, options, &mut rand::thread_rng())
    }

    /// Weight and bias are drawn from `U(-1/sqrt(fan_in), 1/sqrt(fan_in))`
    /// with `fan_in = in_channels·k·k`.
    pub fn new_with_rng<R: Rng + ?Sized>(
        in_channels: usize,
        out_channels: usize,
        kernel: usize,
        options: Conv2dOptions,
        rng: &mut R,
    ) -> Result<Self, ElevenError> {
        let fan_in = in_channels * kernel * kernel;
        if fan_in == 0 || out_channels == 0 || options.stride == 0 {
            return Err(ElevenError::InvalidArgument(format!(
                "Conv2d({} -> {}, kernel {}, {:?}) has an empty dimension",
                in_channels, out_channels, kernel, options
            )));
        }
        let bound = 1.0 / (fan_in as f32).sqrt();
        let weight = zeros(&[1, out_channels, fan_in])?;
        let bias = zeros(&[1, out_channels, 1])?;
        uniform_(&weight, -bound, bound, rng)?;
        uniform_(&bias, -bound, bound, rng)?;
        weight.set_requires_grad(true)?;
        bias.set_requires_grad(true)?;
        Ok(Conv2d {
            weight,
            bias,
            in_channels,
            out_channels,
            kernel,
            options,
        })
    }

    pub fn weight(&self) -> &Tensor {
        &self.weight
    }

    pub fn bias(&self) -> &Tensor {
        &self.bias
    }

    pub fn out_channels(&self) -> usize {
        self.out_channels
    }
}

impl Module for Conv2d {
    /// `(b, in_c, h, w) -> (b, out_c, oh, ow)`.
    fn forward(&self, input: &Node) -> Result<Node, ElevenError> {
        let shape = input.shape();
        if shape.len() != 4 || shape[1] != self.in_channels {
            return Err(ElevenError::ShapeMismatch {
                expected: vec![shape.first().copied().unwrap_or(0), self.in_channels],
                actual: shape,
                operation: "Conv2d::forward".to_string(),
            });
        }
        let k = (self.kernel, self.kernel);
        let geometry = Img2ColGeometry::new(shape[1], shape[2], shape[3], k, self.options.stride, self.options.padding)?;
        let columns = img2col_op(input, k, self.options.stride, self.options.padding)?;
        let product = bmm_op(&self.weight.node(), &columns)?;
        let out = add_op(&product, &self.bias.node())?.materialize()?;
        out.view(&[shape[0], self.out_channels, geometry.out_height, geometry.out_width])
    }

    fn parameters(&self) -> Vec<(String, Tensor)> {
        vec![
            ("weight".to_string(), self.weight.clone()),
            ("bias".to_string(), self.bias.clone()),
        ]
    }
}

#[cfg(test)]
#[path = "conv_test.rs"]
mod tests;
