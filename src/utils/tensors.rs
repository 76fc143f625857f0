use burn::tensor::{backend::Backend, Data, ElementConversion, Int, Shape, Tensor};

/// Fit a token sequence to exactly `seq_length` ids.
///
/// Short sequences are padded at the front with `pad_token`, and long sequences keep their
/// trailing `seq_length` tokens. This is the pre-padding, pre-truncating convention the
/// classifier was trained with, so changing it degrades accuracy without any error.
pub fn normalize(pad_token: usize, tokens: &[usize], seq_length: usize) -> Vec<usize> {
    if tokens.len() >= seq_length {
        return tokens[tokens.len() - seq_length..].to_vec();
    }

    let mut normalized = vec![pad_token; seq_length - tokens.len()];
    normalized.extend_from_slice(tokens);

    normalized
}

/// Normalize every sequence to a specific length and stack them into a rectangular int tensor
/// of shape `[batch_size, seq_length]`
pub fn pad_to<B: Backend>(
    pad_token: usize,
    tokens_list: Vec<Vec<usize>>,
    seq_length: usize,
    device: &B::Device,
) -> Tensor<B, 2, Int> {
    let batch_size = tokens_list.len();

    let ids: Vec<B::IntElem> = tokens_list
        .iter()
        .flat_map(|tokens| normalize(pad_token, tokens, seq_length))
        .map(|e| (e as i64).elem())
        .collect();

    Tensor::from_data(
        Data::new(ids, Shape::new([batch_size, seq_length])),
        device,
    )
}
