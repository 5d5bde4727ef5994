/// biLSTM over static and contextual word vectors
pub mod ebilstm;
